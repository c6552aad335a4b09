use super::with_context;
use crate::cli::parser::{CategoryAction, Cli, Commands};
use crate::config::Config;
use crate::core::sync::fetch_snapshot;
use crate::core::taxonomy::TaxonomyLogic;
use crate::errors::AppResult;
use crate::ui::messages::{confirm, info, success};
use crate::utils::colors::{colorize_optional, paint_category};
use crate::utils::table::Table;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Category { action } = &cli.command else {
        return Ok(());
    };

    with_context(cfg, cli.offline, "category", |ctx| match action {
        CategoryAction::Add { name } => {
            let c = TaxonomyLogic::add_category(ctx, name)?;
            success(format!("Category '{}' created (id {})", c.name, c.id));
            Ok(())
        }
        CategoryAction::List => {
            let snapshot = fetch_snapshot(ctx.backend, &ctx.session)?;
            if snapshot.categories.is_empty() {
                info("No categories yet. Create one, or run `healthlog seed`.");
                return Ok(());
            }

            let mut table = Table::new(&["ID", "CATEGORY", "EVENT TYPES"]);
            for c in &snapshot.categories {
                let types: Vec<&str> = snapshot.types_in(&c.id).map(|t| t.name.as_str()).collect();
                table.add_row(vec![
                    c.id.clone(),
                    paint_category(cfg, &c.name, &c.name),
                    colorize_optional(&if types.is_empty() {
                        "--".to_string()
                    } else {
                        types.join(", ")
                    }),
                ]);
            }
            print!("{}", table.render());
            Ok(())
        }
        CategoryAction::Del { category, yes } => {
            let snapshot = fetch_snapshot(ctx.backend, &ctx.session)?;
            let c = snapshot.resolve_category(category)?;
            let types = snapshot.types_in(&c.id).count();

            let prompt = format!(
                "Delete category '{}' and its {} event type(s)? This cannot be undone.",
                c.name, types
            );
            if !*yes && !confirm(&prompt) {
                info("Operation cancelled.");
                return Ok(());
            }

            let removed = TaxonomyLogic::delete_category(ctx, c)?;
            success(format!(
                "Category '{}' deleted with {} event type(s)",
                c.name, removed
            ));
            Ok(())
        }
    })
}
