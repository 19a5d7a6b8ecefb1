use chrono::NaiveDate;
use filmorate_core::{EntityKind, ServiceError, Stores, UniqueField, User, UserService};

fn service() -> UserService {
    UserService::from_stores(&Stores::in_memory())
}

fn birthday() -> NaiveDate {
    NaiveDate::from_ymd_opt(1985, 3, 14).unwrap()
}

fn user(login: &str, name: &str) -> User {
    User::new(format!("{login}@mail.test"), login, name, birthday())
}

#[test]
fn create_assigns_id_and_defaults_blank_name_to_login() {
    let users = service();

    let created = users.create_user(user("neo", "  ")).unwrap();
    assert_eq!(created.id, 1);
    assert_eq!(created.name, "neo");

    let named = users.create_user(user("trinity", "Trinity")).unwrap();
    assert_eq!(named.name, "Trinity");
    assert_eq!(users.get_user_by_id(named.id).unwrap(), named);
}

#[test]
fn create_with_client_id_is_invalid() {
    let users = service();
    let mut incoming = user("neo", "");
    incoming.id = 7;

    let err = users.create_user(incoming).unwrap_err();
    assert!(matches!(err, ServiceError::InvalidRequest(_)));
    assert!(users.get_users_list().unwrap().is_empty());
}

#[test]
fn update_requires_an_existing_id() {
    let users = service();

    let err = users.update_user(user("neo", "")).unwrap_err();
    assert!(matches!(err, ServiceError::InvalidRequest(_)));

    let mut ghost = user("ghost", "");
    ghost.id = 404;
    let err = users.update_user(ghost).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound {
            kind: EntityKind::User,
            id: 404
        }
    ));
}

#[test]
fn update_keeping_own_email_and_login_succeeds() {
    let users = service();
    let mut created = users.create_user(user("neo", "")).unwrap();

    created.name = "Thomas Anderson".to_string();
    let updated = users.update_user(created.clone()).unwrap();

    assert_eq!(updated, created);
}

#[test]
fn update_into_a_taken_email_is_rejected() {
    let users = service();
    users.create_user(user("neo", "")).unwrap();
    let mut smith = users.create_user(user("smith", "")).unwrap();

    smith.email = "neo@mail.test".to_string();
    let err = users.update_user(smith).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::UniquenessViolation {
            field: UniqueField::Email,
            ..
        }
    ));
}

#[test]
fn befriending_yourself_is_invalid() {
    let users = service();
    let neo = users.create_user(user("neo", "")).unwrap();

    let err = users.add_friend(neo.id, neo.id).unwrap_err();
    assert!(matches!(err, ServiceError::InvalidRequest(_)));
    let err = users.delete_friend(neo.id, neo.id).unwrap_err();
    assert!(matches!(err, ServiceError::InvalidRequest(_)));
}

#[test]
fn friend_operations_require_both_users() {
    let users = service();
    let neo = users.create_user(user("neo", "")).unwrap();

    let err = users.add_friend(neo.id, 50).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound {
            kind: EntityKind::User,
            id: 50
        }
    ));
    let err = users.get_common_friends(51, neo.id).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { id: 51, .. }));
    let err = users.get_friends_list_by_id(52).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { id: 52, .. }));
}

#[test]
fn deleted_user_id_is_not_reused() {
    let users = service();
    let first = users.create_user(user("neo", "")).unwrap();
    users.delete_user(first.id).unwrap();

    let second = users.create_user(user("neo", "")).unwrap();
    assert_eq!(second.id, first.id + 1);
}

#[test]
fn sqlite_backend_persists_across_services() {
    let dir = tempfile::tempdir().unwrap();
    let config = filmorate_core::StorageConfig::Sqlite {
        path: dir.path().join("users.db"),
    };

    let created = {
        let stores = Stores::open(&config).unwrap();
        UserService::from_stores(&stores)
            .create_user(user("neo", ""))
            .unwrap()
    };

    let stores = Stores::open(&config).unwrap();
    assert_eq!(stores.backend_name(), "sqlite");
    let reloaded = UserService::from_stores(&stores)
        .get_user_by_id(created.id)
        .unwrap();
    assert_eq!(reloaded, created);
}
