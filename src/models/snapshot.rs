//! Everything a view needs: the signed-in user's taxonomy and events.

use super::{category::EventCategory, event::Event, event_type::EventType};
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub categories: Vec<EventCategory>,
    pub event_types: Vec<EventType>,
    pub events: Vec<Event>,
}

impl Snapshot {
    /// Event type whose name is exactly `type_name` (the stored denormalized name).
    pub fn type_named(&self, type_name: &str) -> Option<&EventType> {
        self.event_types.iter().find(|t| t.name == type_name)
    }

    pub fn category_for_type(&self, type_name: &str) -> Option<&EventCategory> {
        let et = self.type_named(type_name)?;
        self.categories.iter().find(|c| c.id == et.category_id)
    }

    /// Category name for an event type name, empty when it cannot be resolved.
    pub fn category_name_for(&self, type_name: &str) -> String {
        self.category_for_type(type_name)
            .map(|c| c.name.clone())
            .unwrap_or_default()
    }

    pub fn types_in<'a>(&'a self, category_id: &'a str) -> impl Iterator<Item = &'a EventType> {
        self.event_types
            .iter()
            .filter(move |t| t.category_id == category_id)
    }

    pub fn event(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// An event is orphaned when no event type carries its `type` name anymore.
    pub fn is_orphan(&self, ev: &Event) -> bool {
        self.type_named(&ev.kind).is_none()
    }

    pub fn events_of_type(&self, type_name: &str) -> usize {
        self.events.iter().filter(|e| e.kind == type_name).count()
    }

    /// Events left without a type once `event_type` is gone; none while
    /// another type still carries the same name.
    pub fn events_orphaned_by(&self, event_type: &EventType) -> usize {
        let name_survives = self
            .event_types
            .iter()
            .any(|t| t.id != event_type.id && t.name == event_type.name);
        if name_survives {
            0
        } else {
            self.events_of_type(&event_type.name)
        }
    }

    /// Resolve a category by id first, then by (case-insensitive) name.
    pub fn resolve_category(&self, reference: &str) -> AppResult<&EventCategory> {
        if let Some(c) = self.categories.iter().find(|c| c.id == reference) {
            return Ok(c);
        }

        let mut matches = self.categories.iter().filter(|c| c.has_name(reference));
        match (matches.next(), matches.next()) {
            (Some(c), None) => Ok(c),
            (Some(_), Some(_)) => Err(AppError::Ambiguous(reference.to_string())),
            _ => Err(AppError::NotFound(format!("category '{}'", reference))),
        }
    }

    /// Resolve an event type by id or name, optionally restricted to one category.
    pub fn resolve_event_type(
        &self,
        reference: &str,
        category_id: Option<&str>,
    ) -> AppResult<&EventType> {
        let in_scope = |t: &&EventType| category_id.is_none_or(|cid| t.category_id == cid);

        if let Some(t) = self
            .event_types
            .iter()
            .filter(in_scope)
            .find(|t| t.id == reference)
        {
            return Ok(t);
        }

        let mut matches = self
            .event_types
            .iter()
            .filter(in_scope)
            .filter(|t| t.has_name(reference));

        match (matches.next(), matches.next()) {
            (Some(t), None) => Ok(t),
            // Same name in two categories: the stored value is the name anyway.
            (Some(t), Some(other)) if t.name == other.name => Ok(t),
            (Some(_), Some(_)) => Err(AppError::Ambiguous(reference.to_string())),
            _ => Err(AppError::NotFound(format!("event type '{}'", reference))),
        }
    }

    /// Resolve one specific event type: by id, or by a name only one type carries.
    /// Used where the choice matters (deletion).
    pub fn resolve_single_event_type(&self, reference: &str) -> AppResult<&EventType> {
        if let Some(t) = self.event_types.iter().find(|t| t.id == reference) {
            return Ok(t);
        }

        let mut matches = self.event_types.iter().filter(|t| t.has_name(reference));
        match (matches.next(), matches.next()) {
            (Some(t), None) => Ok(t),
            (Some(_), Some(_)) => Err(AppError::Ambiguous(reference.to_string())),
            _ => Err(AppError::NotFound(format!("event type '{}'", reference))),
        }
    }
}
