use serde_json::json;

use crate::common::{TestApp, project_body, routes};

/// A type, three genres and two age categories to build projects from.
struct Catalog {
    type_id: i32,
    genres: [i32; 3],
    ages: [i32; 2],
}

async fn catalog(app: &TestApp, token: &str) -> Catalog {
    let type_id = app.create_lookup(routes::TYPES, "Series", token).await;
    let genres = [
        app.create_lookup(routes::GENRES, "Drama", token).await,
        app.create_lookup(routes::GENRES, "History", token).await,
        app.create_lookup(routes::GENRES, "Comedy", token).await,
    ];
    let ages = [
        app.create_lookup(routes::AGE_CATEGORIES, "12+", token).await,
        app.create_lookup(routes::AGE_CATEGORIES, "16+", token).await,
    ];
    Catalog {
        type_id,
        genres,
        ages,
    }
}

fn ids(values: &[i32]) -> Vec<i64> {
    values.iter().map(|&v| v as i64).collect()
}

mod writes {
    use super::*;

    #[tokio::test]
    async fn created_project_carries_its_references() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let c = catalog(&app, &token).await;

        let id = app
            .create_project(&token, "Kazakh Khanate", c.type_id, &c.genres[..2], &c.ages[..1])
            .await;
        let res = app.get_with_token(&routes::project(id), &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["title"], "Kazakh Khanate");
        assert_eq!(res.body["type"]["title"], "Series");
        assert_eq!(res.ids_of("genres"), ids(&c.genres[..2]));
        assert_eq!(res.ids_of("age_categories"), ids(&c.ages[..1]));
        assert!(res.body["cover"].is_null());
        assert_eq!(res.body["images"], json!([]));
        assert_eq!(res.body["videos"], json!([]));
    }

    #[tokio::test]
    async fn list_returns_every_project() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let c = catalog(&app, &token).await;
        let first = app.create_project(&token, "First", c.type_id, &[], &[]).await;
        let second = app.create_project(&token, "Second", c.type_id, &[], &[]).await;

        let res = app.get_with_token(routes::PROJECTS, &token).await;

        assert_eq!(res.status, 200);
        let listed: Vec<i64> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_i64().unwrap())
            .collect();
        assert_eq!(listed, vec![first as i64, second as i64]);
    }

    #[tokio::test]
    async fn unknown_references_are_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let c = catalog(&app, &token).await;

        for body in [
            project_body("No type", 999, &[], &[]),
            project_body("No genre", c.type_id, &[999], &[]),
            project_body("No age", c.type_id, &[], &[999]),
        ] {
            let res = app.post_with_token(routes::PROJECTS, &body, &token).await;
            assert_eq!(res.status, 400, "{}", res.text);
            assert_eq!(res.body["code"], "VALIDATION_ERROR");
        }

        let list = app.get_with_token(routes::PROJECTS, &token).await;
        assert_eq!(list.body, json!([]));
    }

    #[tokio::test]
    async fn update_replaces_associations() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let c = catalog(&app, &token).await;
        let id = app
            .create_project(&token, "Original", c.type_id, &c.genres, &c.ages)
            .await;

        let res = app
            .put_with_token(
                &routes::project(id),
                &project_body("Renamed", c.type_id, &c.genres[2..], &[]),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["title"], "Renamed");
        assert_eq!(res.ids_of("genres"), ids(&c.genres[2..]));
        assert_eq!(res.ids_of("age_categories"), Vec::<i64>::new());
    }

    #[tokio::test]
    async fn failed_update_changes_nothing() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let c = catalog(&app, &token).await;
        let id = app
            .create_project(&token, "Original", c.type_id, &c.genres[..1], &[])
            .await;

        let res = app
            .put_with_token(
                &routes::project(id),
                &project_body("Renamed", c.type_id, &[c.genres[1], 999], &[]),
                &token,
            )
            .await;
        assert_eq!(res.status, 400);

        let after = app.get_with_token(&routes::project(id), &token).await;
        assert_eq!(after.body["title"], "Original");
        assert_eq!(after.ids_of("genres"), ids(&c.genres[..1]));
    }

    #[tokio::test]
    async fn missing_project_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let c = catalog(&app, &token).await;

        let get = app.get_with_token(&routes::project(4242), &token).await;
        assert_eq!(get.status, 404);

        let put = app
            .put_with_token(
                &routes::project(4242),
                &project_body("Ghost", c.type_id, &[], &[]),
                &token,
            )
            .await;
        assert_eq!(put.status, 404);
    }

    #[tokio::test]
    async fn invalid_scalars_are_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let c = catalog(&app, &token).await;

        let mut body = project_body("Too old", c.type_id, &[], &[]);
        body["release_year"] = json!(1200);
        let res = app.post_with_token(routes::PROJECTS, &body, &token).await;
        assert_eq!(res.status, 400);

        let body = project_body("   ", c.type_id, &[], &[]);
        let res = app.post_with_token(routes::PROJECTS, &body, &token).await;
        assert_eq!(res.status, 400);
    }
}

mod search {
    use super::*;

    struct Fixture {
        app: TestApp,
        token: String,
        catalog: Catalog,
        khanate: i32,
        comedy: i32,
        percent: i32,
    }

    async fn fixture() -> Fixture {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let c = catalog(&app, &token).await;

        let khanate = app
            .create_project(&token, "Kazakh Khanate", c.type_id, &c.genres[..2], &[])
            .await;
        let comedy = app
            .create_project(&token, "Steppe Laughs", c.type_id, &c.genres[2..], &[])
            .await;

        let mut body = project_body("Discount", c.type_id, &[], &[]);
        body["keywords"] = json!("100% free");
        let percent = app.post_with_token(routes::PROJECTS, &body, &token).await.id();

        Fixture {
            app,
            token,
            catalog: c,
            khanate,
            comedy,
            percent,
        }
    }

    fn found(res: &crate::common::TestResponse) -> Vec<i64> {
        res.body
            .as_array()
            .unwrap_or_else(|| panic!("expected array: {}", res.text))
            .iter()
            .map(|p| p["id"].as_i64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn term_matches_case_insensitively() {
        let f = fixture().await;

        let res = f
            .app
            .get_with_token(&format!("{}?searchTerm=KHANATE", routes::SEARCH), &f.token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(found(&res), vec![f.khanate as i64]);
    }

    #[tokio::test]
    async fn term_matches_keywords_and_description() {
        let f = fixture().await;

        let res = f
            .app
            .get_with_token(&format!("{}?searchTerm=laughs", routes::SEARCH), &f.token)
            .await;
        assert_eq!(found(&res), vec![f.comedy as i64]);

        let res = f
            .app
            .get_with_token(&format!("{}?searchTerm=steppe", routes::SEARCH), &f.token)
            .await;
        assert_eq!(found(&res), vec![f.khanate as i64, f.comedy as i64]);
    }

    #[tokio::test]
    async fn wildcards_in_term_are_literal() {
        let f = fixture().await;

        let res = f
            .app
            .get_with_token(&format!("{}?searchTerm=%25", routes::SEARCH), &f.token)
            .await;

        assert_eq!(found(&res), vec![f.percent as i64]);
    }

    #[tokio::test]
    async fn genre_filter_accepts_repeated_ids() {
        let f = fixture().await;
        let [drama, _, comedy] = f.catalog.genres;

        let res = f
            .app
            .get_with_token(&format!("{}?genre_id={drama}", routes::SEARCH), &f.token)
            .await;
        assert_eq!(found(&res), vec![f.khanate as i64]);

        let res = f
            .app
            .get_with_token(
                &format!("{}?genre_id={drama}&genre_id={comedy}", routes::SEARCH),
                &f.token,
            )
            .await;
        assert_eq!(found(&res), vec![f.khanate as i64, f.comedy as i64]);
    }

    #[tokio::test]
    async fn term_and_genre_combine() {
        let f = fixture().await;
        let comedy = f.catalog.genres[2];

        let res = f
            .app
            .get_with_token(
                &format!("{}?searchTerm=steppe&genre_id={comedy}", routes::SEARCH),
                &f.token,
            )
            .await;

        assert_eq!(found(&res), vec![f.comedy as i64]);
    }

    #[tokio::test]
    async fn no_filter_finds_nothing() {
        let f = fixture().await;

        for query in ["", "?searchTerm=", "?searchTerm=%20%20"] {
            let res = f
                .app
                .get_with_token(&format!("{}{query}", routes::SEARCH), &f.token)
                .await;
            assert_eq!(res.status, 200);
            assert_eq!(res.body, json!([]), "{query:?}");
        }
    }

    #[tokio::test]
    async fn malformed_genre_id_is_rejected() {
        let f = fixture().await;

        let res = f
            .app
            .get_with_token(&format!("{}?genre_id=drama", routes::SEARCH), &f.token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}
