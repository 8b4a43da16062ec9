// Show handlers module
// Each handler maps parsed request input plus store contents to a Reply

use hyper::StatusCode;
use serde_json::{json, Value};

use super::envelope::{create_response, Reply};
use super::form::{parse_episode_count, ShowForm};
use super::types::SHOWS;
use super::ApiError;
use crate::store::{MockDb, Record};

type ApiResult = Result<Reply, ApiError>;

const NO_SUCH_SHOW: &str = "No show with this id exists";

/// GET /
pub fn index() -> ApiResult {
    Ok(create_response(
        Some(json!({"content": "hello world!"})),
        StatusCode::OK,
        "",
    )?)
}

/// GET /mirror/{name}
pub fn mirror(name: &str) -> ApiResult {
    Ok(create_response(Some(json!({ "name": name })), StatusCode::OK, "")?)
}

/// GET /shows
pub fn list_shows(db: &MockDb) -> ApiResult {
    let shows = db.get(SHOWS)?;
    Ok(create_response(Some(json!({ "shows": shows })), StatusCode::OK, "")?)
}

/// GET /shows/{id}
///
/// `id` is `None` when the path segment is not an integer.
pub fn get_show(db: &MockDb, id: Option<u64>) -> ApiResult {
    let show = match id {
        Some(id) => db.get_by_id(SHOWS, id)?,
        None => None,
    };

    Ok(match show {
        Some(record) => create_response(Some(Value::Object(record)), StatusCode::OK, "show found")?,
        None => create_response(None, StatusCode::NOT_FOUND, NO_SUCH_SHOW)?,
    })
}

/// POST /shows
pub fn create_show(db: &MockDb, form: ShowForm) -> ApiResult {
    let (name, episodes_seen) = match (form.name, form.episodes_seen) {
        (Some(name), Some(episodes_seen)) => (name, episodes_seen),
        (name, episodes_seen) => {
            let mut missing = String::new();
            if episodes_seen.is_none() {
                missing.push_str(" (episodes_seen)");
            }
            if name.is_none() {
                missing.push_str(" (name)");
            }
            return Ok(create_response(
                Some(json!({})),
                StatusCode::UNPROCESSABLE_ENTITY,
                &format!(
                    "\"episodes_seen\" and \"name\" are required parameters. You are missing:{missing}"
                ),
            )?);
        }
    };

    let Some(episodes_seen) = parse_episode_count(&episodes_seen) else {
        return Ok(create_response(
            Some(json!({})),
            StatusCode::UNPROCESSABLE_ENTITY,
            "\"episodes_seen\" should be a numeric value",
        )?);
    };

    let mut record = Record::new();
    record.insert("name".to_string(), Value::from(name));
    record.insert("episodes_seen".to_string(), Value::from(episodes_seen));
    let created = db.create(SHOWS, record)?;

    Ok(create_response(
        Some(Value::Object(created)),
        StatusCode::CREATED,
        "successfully created the show",
    )?)
}

/// PUT /shows/{id}
///
/// Only the submitted fields are merged; values are stored as given.
pub fn update_show(db: &MockDb, id: Option<u64>, form: ShowForm) -> ApiResult {
    let mut fields = Record::new();
    if let Some(episodes_seen) = form.episodes_seen {
        fields.insert("episodes_seen".to_string(), Value::from(episodes_seen));
    }
    if let Some(name) = form.name {
        fields.insert("name".to_string(), Value::from(name));
    }

    let updated = match id {
        Some(id) => db.update_by_id(SHOWS, id, fields)?,
        None => None,
    };

    Ok(match updated {
        Some(record) => {
            create_response(Some(Value::Object(record)), StatusCode::OK, "show updated")?
        }
        None => create_response(Some(json!({})), StatusCode::NOT_FOUND, "Id not found")?,
    })
}

/// DELETE /shows/{id}
pub fn delete_show(db: &MockDb, id: Option<u64>) -> ApiResult {
    let deleted = match id {
        Some(id) => db.delete_by_id(SHOWS, id)?,
        None => false,
    };

    Ok(if deleted {
        create_response(None, StatusCode::OK, "Show deleted")?
    } else {
        create_response(None, StatusCode::NOT_FOUND, NO_SUCH_SHOW)?
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::default_shows;
    use crate::store::record_id;

    fn seeded_db() -> MockDb {
        let db = MockDb::new();
        db.seed(SHOWS, default_shows()).unwrap();
        db
    }

    fn form(name: Option<&str>, episodes_seen: Option<&str>) -> ShowForm {
        ShowForm {
            name: name.map(ToString::to_string),
            episodes_seen: episodes_seen.map(ToString::to_string),
        }
    }

    fn result(reply: &Reply) -> Value {
        reply
            .envelope
            .result
            .clone()
            .map_or(Value::Null, Value::Object)
    }

    #[test]
    fn test_index_and_mirror() {
        let reply = index().unwrap();
        assert_eq!(result(&reply), json!({"content": "hello world!"}));

        let reply = mirror("neo").unwrap();
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(result(&reply), json!({"name": "neo"}));
    }

    #[test]
    fn test_list_shows() {
        let reply = list_shows(&seeded_db()).unwrap();
        let shows = result(&reply)["shows"].as_array().unwrap().clone();
        assert_eq!(shows.len(), 4);
        assert_eq!(shows[1]["name"], "Naruto");
    }

    #[test]
    fn test_list_shows_empty_store() {
        let reply = list_shows(&MockDb::new()).unwrap();
        assert_eq!(result(&reply), json!({"shows": []}));
    }

    #[test]
    fn test_get_show() {
        let db = seeded_db();
        let reply = get_show(&db, Some(3)).unwrap();
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.envelope.message, "show found");
        assert_eq!(result(&reply)["name"], "Black Mirror");

        for id in [Some(42), None] {
            let reply = get_show(&db, id).unwrap();
            assert_eq!(reply.status, StatusCode::NOT_FOUND);
            assert_eq!(reply.envelope.message, NO_SUCH_SHOW);
            assert!(reply.envelope.result.is_none());
        }
    }

    #[test]
    fn test_create_show() {
        let db = seeded_db();
        let reply = create_show(&db, form(Some("X"), Some("3"))).unwrap();
        assert_eq!(reply.status, StatusCode::CREATED);
        assert!(reply.envelope.success);
        assert_eq!(
            result(&reply),
            json!({"id": 5, "name": "X", "episodes_seen": 3})
        );
    }

    #[test]
    fn test_create_ids_never_repeat() {
        let db = seeded_db();
        let mut seen: Vec<u64> = db.get(SHOWS).unwrap().iter().filter_map(record_id).collect();
        for i in 0..5 {
            let reply = create_show(&db, form(Some("S"), Some("1"))).unwrap();
            let id = result(&reply)["id"].as_u64().unwrap();
            assert!(!seen.contains(&id));
            seen.push(id);
            if i % 2 == 0 {
                delete_show(&db, Some(id)).unwrap();
            }
        }
    }

    #[test]
    fn test_create_missing_fields() {
        let db = seeded_db();
        let cases = [
            (form(Some("X"), None), " (episodes_seen)"),
            (form(None, Some("3")), " (name)"),
            (form(None, None), " (episodes_seen) (name)"),
        ];
        for (input, missing) in cases {
            let reply = create_show(&db, input).unwrap();
            assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
            assert!(!reply.envelope.success);
            assert!(
                reply.envelope.message.ends_with(&format!("You are missing:{missing}")),
                "{}",
                reply.envelope.message
            );
            assert_eq!(result(&reply), json!({}));
        }
        assert_eq!(db.get(SHOWS).unwrap().len(), 4);
    }

    #[test]
    fn test_create_non_numeric_episodes() {
        let db = seeded_db();
        for bad in ["three", "-1", "", "2.5"] {
            let reply = create_show(&db, form(Some("X"), Some(bad))).unwrap();
            assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(
                reply.envelope.message,
                "\"episodes_seen\" should be a numeric value"
            );
        }
        assert_eq!(db.get(SHOWS).unwrap().len(), 4);
    }

    #[test]
    fn test_update_show_partial() {
        let db = seeded_db();
        let reply = update_show(&db, Some(2), form(None, Some("221"))).unwrap();
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.envelope.message, "show updated");
        // no numeric coercion on update
        assert_eq!(
            result(&reply),
            json!({"id": 2, "name": "Naruto", "episodes_seen": "221"})
        );
    }

    #[test]
    fn test_update_skips_numeric_validation() {
        let db = seeded_db();
        let reply = update_show(&db, Some(1), form(Some("GoT"), Some("lots"))).unwrap();
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(result(&reply)["episodes_seen"], "lots");
    }

    #[test]
    fn test_update_missing_id() {
        let db = seeded_db();
        for input in [form(Some("X"), Some("1")), form(None, None)] {
            let reply = update_show(&db, Some(99), input).unwrap();
            assert_eq!(reply.status, StatusCode::NOT_FOUND);
            assert_eq!(reply.envelope.message, "Id not found");
        }
        let reply = update_show(&db, None, form(Some("X"), None)).unwrap();
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_delete_then_get_is_404() {
        let db = seeded_db();
        let reply = delete_show(&db, Some(4)).unwrap();
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.envelope.message, "Show deleted");
        assert!(reply.envelope.result.is_none());

        assert_eq!(get_show(&db, Some(4)).unwrap().status, StatusCode::NOT_FOUND);
        assert_eq!(delete_show(&db, Some(4)).unwrap().status, StatusCode::NOT_FOUND);
    }
}
