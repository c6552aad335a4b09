use super::with_context;
use crate::cli::parser::{Cli, Commands, TypeAction};
use crate::config::Config;
use crate::core::sync::fetch_snapshot;
use crate::core::taxonomy::TaxonomyLogic;
use crate::errors::AppResult;
use crate::ui::messages::{confirm, info, success, warning};
use crate::utils::colors::paint_category;
use crate::utils::table::Table;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Type { action } = &cli.command else {
        return Ok(());
    };

    with_context(cfg, cli.offline, "type", |ctx| {
        let snapshot = fetch_snapshot(ctx.backend, &ctx.session)?;

        match action {
            TypeAction::Add { category, name } => {
                let c = snapshot.resolve_category(category)?;
                let t = TaxonomyLogic::add_event_type(ctx, c, name)?;
                success(format!(
                    "Event type '{}' created in '{}' (id {})",
                    t.name, c.name, t.id
                ));
            }
            TypeAction::List { category } => {
                let only = match category {
                    Some(r) => Some(snapshot.resolve_category(r)?.id.clone()),
                    None => None,
                };

                let mut table = Table::new(&["ID", "EVENT TYPE", "CATEGORY", "EVENTS"]);
                for t in &snapshot.event_types {
                    if only.as_deref().is_some_and(|id| id != t.category_id) {
                        continue;
                    }
                    let cat = snapshot
                        .categories
                        .iter()
                        .find(|c| c.id == t.category_id)
                        .map(|c| c.name.as_str())
                        .unwrap_or("?");
                    table.add_row(vec![
                        t.id.clone(),
                        t.name.clone(),
                        paint_category(cfg, cat, cat),
                        snapshot.events_of_type(&t.name).to_string(),
                    ]);
                }

                if table.is_empty() {
                    info("No event types.");
                } else {
                    print!("{}", table.render());
                }
            }
            TypeAction::Del { event_type, yes } => {
                let t = snapshot.resolve_single_event_type(event_type)?;
                let orphaned = snapshot.events_orphaned_by(t);

                if orphaned > 0 {
                    warning(format!(
                        "{} event(s) are logged as '{}' and will no longer match any type \
                         (see `healthlog list --orphans`).",
                        orphaned, t.name
                    ));
                }

                if !*yes && !confirm(&format!("Delete event type '{}'?", t.name)) {
                    info("Operation cancelled.");
                    return Ok(());
                }

                TaxonomyLogic::delete_event_type(ctx, t)?;
                success(format!("Event type '{}' deleted", t.name));
            }
        }
        Ok(())
    })
}
