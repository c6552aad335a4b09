//! Category / event-type administration.

use crate::backend::{Filter, Table};
use crate::core::context::Context;
use crate::core::sync::{decode_row, select_owned};
use crate::db::{log::ttlog_quiet, mirror};
use crate::errors::{AppError, AppResult};
use crate::models::category::{EventCategory, NewCategory};
use crate::models::event_type::{EventType, NewEventType};
use tracing::info;

/// Default taxonomy created by `seed`.
pub const DEFAULT_TAXONOMY: &[(&str, &[&str])] = &[
    ("Restroom", &["Bathroom Visit #1", "Bathroom Visit #2"]),
    ("Symptom", &["Headache", "Nausea"]),
];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub categories_created: usize,
    pub types_created: usize,
}

pub struct TaxonomyLogic;

impl TaxonomyLogic {
    pub fn categories(ctx: &Context) -> AppResult<Vec<EventCategory>> {
        select_owned(ctx.backend, &ctx.session, Table::Categories, &[])
    }

    pub fn event_types(ctx: &Context) -> AppResult<Vec<EventType>> {
        select_owned(ctx.backend, &ctx.session, Table::EventTypes, &[])
    }

    pub fn add_category(ctx: &Context, name: &str) -> AppResult<EventCategory> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Please enter a category name".into()));
        }

        if Self::categories(ctx)?.iter().any(|c| c.has_name(name)) {
            return Err(AppError::Validation(format!(
                "Category '{}' already exists",
                name
            )));
        }

        let payload = NewCategory {
            name: name.to_string(),
            user_id: ctx.user_id().to_string(),
        };
        let row = ctx
            .backend
            .insert(&ctx.session, Table::Categories, serde_json::to_value(&payload)?)?;
        let category: EventCategory = decode_row(row)?;

        mirror::upsert_category(ctx.conn, &category)?;
        ttlog_quiet(ctx.conn, "category_add", &category.id, &category.name);
        info!(id = %category.id, "category created");
        Ok(category)
    }

    /// Delete a category after its event types. Not atomic: a failure on the
    /// second call leaves the category without types.
    /// Returns how many event types went with it.
    pub fn delete_category(ctx: &Context, category: &EventCategory) -> AppResult<usize> {
        let types_removed = ctx.backend.delete(
            &ctx.session,
            Table::EventTypes,
            &[
                Filter::eq("categoryid", &category.id),
                Filter::owner(&ctx.session),
            ],
        )?;
        mirror::delete_types_of_category(ctx.conn, &category.id)?;

        let removed = ctx
            .backend
            .delete(&ctx.session, Table::Categories, &ctx.own_row(&category.id))?;
        if removed == 0 {
            return Err(AppError::NotFound(format!("category '{}'", category.name)));
        }
        mirror::delete_row(ctx.conn, Table::Categories, &category.id)?;

        ttlog_quiet(
            ctx.conn,
            "category_del",
            &category.id,
            &format!("{} ({} event types)", category.name, types_removed),
        );
        Ok(types_removed)
    }

    pub fn add_event_type(
        ctx: &Context,
        category: &EventCategory,
        name: &str,
    ) -> AppResult<EventType> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation(
                "Please enter an event type name".into(),
            ));
        }

        let siblings: Vec<EventType> = select_owned(
            ctx.backend,
            &ctx.session,
            Table::EventTypes,
            &[Filter::eq("categoryid", &category.id)],
        )?;
        if siblings.iter().any(|t| t.has_name(name)) {
            return Err(AppError::Validation(format!(
                "Event type '{}' already exists in '{}'",
                name, category.name
            )));
        }

        let payload = NewEventType {
            name: name.to_string(),
            category_id: category.id.clone(),
            user_id: ctx.user_id().to_string(),
        };
        let row = ctx
            .backend
            .insert(&ctx.session, Table::EventTypes, serde_json::to_value(&payload)?)?;
        let event_type: EventType = decode_row(row)?;

        mirror::upsert_event_type(ctx.conn, &event_type)?;
        ttlog_quiet(
            ctx.conn,
            "type_add",
            &event_type.id,
            &format!("{} / {}", category.name, event_type.name),
        );
        Ok(event_type)
    }

    pub fn delete_event_type(ctx: &Context, event_type: &EventType) -> AppResult<()> {
        let removed = ctx
            .backend
            .delete(&ctx.session, Table::EventTypes, &ctx.own_row(&event_type.id))?;
        if removed == 0 {
            return Err(AppError::NotFound(format!(
                "event type '{}'",
                event_type.name
            )));
        }

        mirror::delete_row(ctx.conn, Table::EventTypes, &event_type.id)?;
        ttlog_quiet(ctx.conn, "type_del", &event_type.id, &event_type.name);
        Ok(())
    }

    /// Create the default taxonomy, skipping categories and types that exist.
    pub fn seed(ctx: &Context) -> AppResult<SeedReport> {
        let mut report = SeedReport::default();
        let mut categories = Self::categories(ctx)?;
        let types = Self::event_types(ctx)?;

        for (cat_name, type_names) in DEFAULT_TAXONOMY {
            let category = match categories.iter().find(|c| c.has_name(cat_name)) {
                Some(c) => c.clone(),
                None => {
                    let c = Self::add_category(ctx, cat_name)?;
                    report.categories_created += 1;
                    categories.push(c.clone());
                    c
                }
            };

            for type_name in *type_names {
                let exists = types
                    .iter()
                    .any(|t| t.category_id == category.id && t.has_name(type_name));
                if !exists {
                    Self::add_event_type(ctx, &category, type_name)?;
                    report.types_created += 1;
                }
            }
        }

        Ok(report)
    }
}
