use chrono::NaiveDate;
use filmorate_core::{Film, User, UNASSIGNED_ID};
use serde_json::json;
use std::collections::BTreeSet;

#[test]
fn user_payload_without_id_or_name_uses_defaults() {
    let user: User = serde_json::from_value(json!({
        "email": "neo@mail.test",
        "login": "neo",
        "birthday": "1985-03-14"
    }))
    .unwrap();

    assert_eq!(user.id, UNASSIGNED_ID);
    assert!(!user.has_id());
    assert_eq!(user.name, "");
    assert_eq!(user.birthday, NaiveDate::from_ymd_opt(1985, 3, 14).unwrap());
}

#[test]
fn film_payload_accepts_bare_reference_ids() {
    let film: Film = serde_json::from_value(json!({
        "name": "The Matrix",
        "description": "a film",
        "release_date": "1999-03-31",
        "duration": 136,
        "mpa": { "id": 4 },
        "genres": [{ "id": 6 }, { "id": 4 }]
    }))
    .unwrap();

    assert_eq!(film.id, UNASSIGNED_ID);
    assert_eq!(film.mpa.id, 4);
    assert_eq!(film.genre_ids(), BTreeSet::from([4, 6]));
    assert!(film.likes.is_empty());
}

#[test]
fn film_serializes_likes_as_sorted_array() {
    let mut film = Film::new(
        "Heat",
        "",
        NaiveDate::from_ymd_opt(1995, 12, 15).unwrap(),
        170,
        4,
    );
    film.likes = BTreeSet::from([3, 1, 2]);

    let value = serde_json::to_value(&film).unwrap();
    assert_eq!(value["likes"], json!([1, 2, 3]));
    assert_eq!(value["release_date"], json!("1995-12-15"));
    assert_eq!(value["mpa"], json!({ "id": 4, "name": "" }));
}

#[test]
fn negative_duration_is_rejected_at_the_boundary() {
    let result: Result<Film, _> = serde_json::from_value(json!({
        "name": "Broken",
        "release_date": "2000-01-01",
        "duration": -5,
        "mpa": { "id": 1 }
    }));
    assert!(result.is_err());
}
