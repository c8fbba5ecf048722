//! Name-or-id lookup shared by every command that takes a resource argument.

use crate::error::{Result, SfsError};
use crate::resource::Resource;

/// A manager whose resources can be addressed by id or by name.
pub trait Lookup {
    /// Human noun used in messages, e.g. `share` or `share type`.
    fn kind(&self) -> &'static str;

    fn get(&self, id: &str) -> Result<Resource>;

    fn list_by_name(&self, name: &str) -> Result<Vec<Resource>>;
}

/// Tries `name_or_id` as an id first, then as an exact name.
pub fn find_resource<L: Lookup + ?Sized>(manager: &L, name_or_id: &str) -> Result<Resource> {
    match manager.get(name_or_id) {
        Err(SfsError::NotFound(_)) => {}
        other => return other,
    }

    let mut matches: Vec<Resource> = manager
        .list_by_name(name_or_id)?
        .into_iter()
        .filter(|resource| resource.name() == Some(name_or_id))
        .collect();
    match matches.len() {
        0 => Err(SfsError::NotFound(format!(
            "No {} with a name or ID of '{}' exists.",
            manager.kind(),
            name_or_id
        ))),
        1 => Ok(matches.remove(0)),
        _ => Err(SfsError::NoUniqueMatch(format!(
            "Multiple {} matches found for '{}', use an ID to be more specific.",
            manager.kind(),
            name_or_id
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::memory::fixtures::{client_at, path_of};
    use serde_json::json;

    #[test]
    fn finds_by_id_without_listing() {
        let (client, transport) = client_at("2.40");
        transport.respond_json(200, json!({"share": {"id": "s1", "name": "web"}}));
        let share = find_resource(&client.shares(), "s1").unwrap();
        assert_eq!(share.id(), Some("s1"));
        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    fn falls_back_to_exact_name_match() {
        let (client, transport) = client_at("2.40");
        transport
            .respond_json(404, json!({"itemNotFound": {"message": "not found"}}))
            .respond_json(
                200,
                json!({"shares": [{"id": "s1", "name": "web"}, {"id": "s2", "name": "web-2"}]}),
            );
        let share = find_resource(&client.shares(), "web").unwrap();
        assert_eq!(share.id(), Some("s1"));
        assert_eq!(
            path_of(&transport.requests()[1]),
            "/shares/detail?name=web"
        );
    }

    #[test]
    fn reports_missing_and_ambiguous_names() {
        let (client, transport) = client_at("2.40");
        transport
            .respond_json(404, json!({"itemNotFound": {"message": "not found"}}))
            .respond_json(200, json!({"shares": []}));
        let err = find_resource(&client.shares(), "ghost").unwrap_err();
        assert_eq!(err.to_string(), "No share with a name or ID of 'ghost' exists.");

        transport
            .respond_json(404, json!({"itemNotFound": {"message": "not found"}}))
            .respond_json(200, json!({"shares": [{"id": "a", "name": "dup"}, {"id": "b", "name": "dup"}]}));
        let err = find_resource(&client.shares(), "dup").unwrap_err();
        assert!(matches!(err, SfsError::NoUniqueMatch(_)));
    }

    #[test]
    fn other_errors_are_not_masked() {
        let (client, transport) = client_at("2.40");
        transport.respond_json(500, json!({"computeFault": {"message": "boom"}}));
        let err = find_resource(&client.shares(), "s1").unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(transport.request_count(), 1);
    }
}
