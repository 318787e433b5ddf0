use serde_json::json;

use crate::common::{TestApp, role_body, routes};

mod lookups {
    use super::*;

    #[tokio::test]
    async fn genre_crud_round_trip() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let id = app.create_lookup(routes::GENRES, "Drama", &token).await;

        let fetched = app.get_with_token(&routes::genre(id), &token).await;
        assert_eq!(fetched.status, 200);
        assert_eq!(fetched.body["title"], "Drama");

        let renamed = app
            .put_with_token(&routes::genre(id), &json!({"title": "Historical drama"}), &token)
            .await;
        assert_eq!(renamed.status, 200, "{}", renamed.text);
        assert_eq!(renamed.body["title"], "Historical drama");

        let list = app.get_with_token(routes::GENRES, &token).await;
        assert_eq!(list.body.as_array().unwrap().len(), 1);

        let deleted = app.delete_with_token(&routes::genre(id), &token).await;
        assert_eq!(deleted.status, 204);

        let gone = app.get_with_token(&routes::genre(id), &token).await;
        assert_eq!(gone.status, 404);
        assert_eq!(gone.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn duplicate_titles_conflict() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        app.create_lookup(routes::AGE_CATEGORIES, "12+", &token).await;
        let res = app
            .post_with_token(routes::AGE_CATEGORIES, &json!({"title": "12+"}), &token)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app
            .post_with_token(routes::TYPES, &json!({"title": "   "}), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn non_numeric_id_is_a_bad_request() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app.get_with_token("/v1/genres/abc", &token).await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn type_in_use_cannot_be_deleted() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let series = app.create_lookup(routes::TYPES, "Series", &token).await;
        let project = app.create_project(&token, "Khanate", series, &[], &[]).await;

        let res = app.delete_with_token(&routes::project_type(series), &token).await;
        assert_eq!(res.status, 409);

        let still_there = app.get_with_token(&routes::project(project), &token).await;
        assert_eq!(still_there.body["type"]["title"], "Series");
    }

    #[tokio::test]
    async fn deleting_a_genre_detaches_it_from_projects() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let film = app.create_lookup(routes::TYPES, "Film", &token).await;
        let drama = app.create_lookup(routes::GENRES, "Drama", &token).await;
        let comedy = app.create_lookup(routes::GENRES, "Comedy", &token).await;
        let project = app
            .create_project(&token, "Mixed", film, &[drama, comedy], &[])
            .await;

        let res = app.delete_with_token(&routes::genre(drama), &token).await;
        assert_eq!(res.status, 204);

        let view = app.get_with_token(&routes::project(project), &token).await;
        assert_eq!(view.ids_of("genres"), vec![comedy as i64]);
    }
}

mod roles {
    use super::*;

    #[tokio::test]
    async fn builtin_roles_are_seeded() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app.get_with_token(routes::ROLES, &token).await;

        assert_eq!(res.status, 200);
        let titles: Vec<&str> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|r| r["title"].as_str())
            .collect();
        assert!(titles.contains(&"admin"));
        assert!(titles.contains(&"user"));
    }

    #[tokio::test]
    async fn levels_outside_range_are_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        for level in [-1, 4] {
            let res = app
                .post_with_token(routes::ROLES, &role_body("odd", level), &token)
                .await;
            assert_eq!(res.status, 400, "level {level}");
        }
    }

    #[tokio::test]
    async fn update_replaces_levels() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let id = app.create_role("editors", 2, &token).await;

        let res = app
            .put_with_token(&routes::role(id), &role_body("editors", 3), &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["projects"], 3);
        assert_eq!(res.body["roles"], 3);
    }

    #[tokio::test]
    async fn builtin_roles_cannot_be_deleted() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let roles = app.get_with_token(routes::ROLES, &token).await;
        let user_role = roles
            .body
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["title"] == "user")
            .and_then(|r| r["id"].as_i64())
            .unwrap() as i32;

        let res = app.delete_with_token(&routes::role(user_role), &token).await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn deleted_role_is_removed_from_members() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let (user_id, _) = app.create_authenticated_user("member@ozinshe.test").await;
        let temp = app.create_role("temporary", 2, &admin).await;
        app.put_with_token(
            &routes::user(user_id),
            &json!({"name": "Member", "email": "member@ozinshe.test", "role_ids": [temp]}),
            &admin,
        )
        .await;

        let res = app.delete_with_token(&routes::role(temp), &admin).await;
        assert_eq!(res.status, 204);

        let user = app.get_with_token(&routes::user(user_id), &admin).await;
        assert!(user.ids_of("roles").is_empty());
    }
}
