use serde_json::json;

use crate::common::{MAX_IMAGE_SIZE, MP4_BYTES, PNG_BYTES, TestApp, routes};

async fn project(app: &TestApp, token: &str) -> i32 {
    let type_id = app.create_lookup(routes::TYPES, "Film", token).await;
    app.create_project(token, "Poster Child", type_id, &[], &[]).await
}

mod images {
    use super::*;

    #[tokio::test]
    async fn upload_then_download_and_show() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let project_id = project(&app, &token).await;

        let uploaded = app.upload_image(project_id, &token).await;
        assert_eq!(uploaded.status, 201, "{}", uploaded.text);
        assert_eq!(uploaded.body["project_id"], project_id);
        let id = uploaded.asset_id();
        assert!(id.ends_with(".png"), "{id}");
        assert_eq!(app.stored_files("images"), 1);

        let download = app.get_with_token(&routes::image(&id), &token).await;
        assert_eq!(download.status, 200);
        assert_eq!(download.bytes, PNG_BYTES);
        assert_eq!(download.header("content-type"), "image/png");
        assert!(download.header("content-disposition").starts_with("attachment"));

        let show = app.get_with_token(&routes::show_image(&id), &token).await;
        assert_eq!(show.status, 200);
        assert_eq!(show.bytes, PNG_BYTES);
        assert!(show.header("content-disposition").starts_with("inline"));

        let view = app.get_with_token(&routes::project(project_id), &token).await;
        assert_eq!(view.body["images"][0]["id"], id.as_str());
    }

    #[tokio::test]
    async fn unsupported_type_is_rejected_without_leftovers() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let project_id = project(&app, &token).await;

        let res = app
            .upload_with_token(
                routes::IMAGES,
                "image",
                ("notes.gif", "image/gif", b"GIF89a".as_slice()),
                &[("project_id", project_id.to_string())],
                &token,
            )
            .await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(app.stored_files("images"), 0);
    }

    #[tokio::test]
    async fn file_name_decides_when_type_is_generic() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let project_id = project(&app, &token).await;

        let res = app
            .upload_with_token(
                routes::IMAGES,
                "image",
                ("photo.jpg", "application/octet-stream", b"\xff\xd8\xff fake jpeg".as_slice()),
                &[("project_id", project_id.to_string())],
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.asset_id().ends_with(".jpeg"));
    }

    #[tokio::test]
    async fn unknown_project_leaves_no_file() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app.upload_image(4242, &token).await;

        assert_eq!(res.status, 404, "{}", res.text);
        assert_eq!(app.stored_files("images"), 0);
    }

    #[tokio::test]
    async fn missing_project_id_leaves_no_file() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app
            .upload_with_token(
                routes::IMAGES,
                "image",
                ("poster.png", "image/png", PNG_BYTES),
                &[],
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(app.stored_files("images"), 0);
    }

    #[tokio::test]
    async fn oversized_file_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let project_id = project(&app, &token).await;
        let big = vec![0u8; MAX_IMAGE_SIZE as usize + 1];

        let res = app
            .upload_with_token(
                routes::IMAGES,
                "image",
                ("huge.png", "image/png", big.as_slice()),
                &[("project_id", project_id.to_string())],
                &token,
            )
            .await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(app.stored_files("images"), 0);
    }

    #[tokio::test]
    async fn delete_removes_row_and_file() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let project_id = project(&app, &token).await;
        let id = app.upload_image(project_id, &token).await.asset_id();

        let res = app.delete_with_token(&routes::image(&id), &token).await;
        assert_eq!(res.status, 204);
        assert_eq!(app.stored_files("images"), 0);

        let again = app.get_with_token(&routes::image(&id), &token).await;
        assert_eq!(again.status, 404);
        let again = app.delete_with_token(&routes::image(&id), &token).await;
        assert_eq!(again.status, 404);
    }

    #[tokio::test]
    async fn malformed_ids_are_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        for id in ["not-an-asset", "..%2Fsecret.png"] {
            let res = app.get_with_token(&routes::image(id), &token).await;
            assert_eq!(res.status, 400, "{id}");
        }

        let mp4 = "00000000-0000-0000-0000-000000000000.mp4";
        let res = app.get_with_token(&routes::image(mp4), &token).await;
        assert_eq!(res.status, 400);
    }
}

mod covers {
    use super::*;

    #[tokio::test]
    async fn cover_upload_sets_cover() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let project_id = project(&app, &token).await;

        let res = app
            .upload_with_token(
                &routes::cover(project_id),
                "image",
                ("cover.png", "image/png", PNG_BYTES),
                &[],
                &token,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        let id = res.asset_id();

        let view = app.get_with_token(&routes::project(project_id), &token).await;
        assert_eq!(view.body["cover"]["id"], id.as_str());
        assert_eq!(view.body["images"][0]["id"], id.as_str());
    }

    #[tokio::test]
    async fn existing_image_can_become_cover() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let project_id = project(&app, &token).await;
        let id = app.upload_image(project_id, &token).await.asset_id();

        let res = app
            .patch_with_token(&routes::cover(project_id), &json!({"image_id": id}), &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["cover"]["id"], id.as_str());
    }

    #[tokio::test]
    async fn cover_must_belong_to_the_project() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let owner = project(&app, &token).await;
        let type_id = app.create_lookup(routes::TYPES, "Series", &token).await;
        let other = app.create_project(&token, "Other", type_id, &[], &[]).await;
        let id = app.upload_image(owner, &token).await.asset_id();

        let res = app
            .patch_with_token(&routes::cover(other), &json!({"image_id": id}), &token)
            .await;

        assert_eq!(res.status, 404);
        let view = app.get_with_token(&routes::project(other), &token).await;
        assert!(view.body["cover"].is_null());
    }

    #[tokio::test]
    async fn deleting_the_cover_image_clears_the_cover() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let project_id = project(&app, &token).await;
        let id = app
            .upload_with_token(
                &routes::cover(project_id),
                "image",
                ("cover.png", "image/png", PNG_BYTES),
                &[],
                &token,
            )
            .await
            .asset_id();

        let res = app.delete_with_token(&routes::image(&id), &token).await;
        assert_eq!(res.status, 204);

        let view = app.get_with_token(&routes::project(project_id), &token).await;
        assert!(view.body["cover"].is_null());
        assert_eq!(view.body["images"], json!([]));
        assert_eq!(app.stored_files("images"), 0);
    }
}

mod videos {
    use super::*;

    #[tokio::test]
    async fn upload_then_download_and_play() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let project_id = project(&app, &token).await;

        let uploaded = app.upload_video(project_id, &token).await;
        assert_eq!(uploaded.status, 201, "{}", uploaded.text);
        assert_eq!(uploaded.body["season"], 2);
        assert_eq!(uploaded.body["episode"], 5);
        let id = uploaded.asset_id();
        assert!(id.ends_with(".mp4"));

        let download = app.get_with_token(&routes::video(&id), &token).await;
        assert_eq!(download.status, 200);
        assert_eq!(download.bytes, MP4_BYTES);
        assert!(download.header("content-disposition").starts_with("attachment"));

        let play = app.get_with_token(&routes::play_video(&id), &token).await;
        assert_eq!(play.status, 200);
        assert_eq!(play.header("content-type"), "video/mp4");
        assert!(play.header("content-disposition").starts_with("inline"));

        let view = app.get_with_token(&routes::project(project_id), &token).await;
        assert_eq!(view.body["videos"][0]["id"], id.as_str());
    }

    #[tokio::test]
    async fn numbering_defaults_to_one() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let project_id = project(&app, &token).await;

        let res = app
            .upload_with_token(
                routes::VIDEOS,
                "video",
                ("film.mp4", "video/mp4", MP4_BYTES),
                &[("project_id", project_id.to_string())],
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["season"], 1);
        assert_eq!(res.body["episode"], 1);
    }

    #[tokio::test]
    async fn bad_numbering_leaves_no_file() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let project_id = project(&app, &token).await;

        for season in ["0", "first"] {
            let res = app
                .upload_with_token(
                    routes::VIDEOS,
                    "video",
                    ("film.mp4", "video/mp4", MP4_BYTES),
                    &[
                        ("project_id", project_id.to_string()),
                        ("season", season.to_string()),
                    ],
                    &token,
                )
                .await;
            assert_eq!(res.status, 400, "{season}");
        }
        assert_eq!(app.stored_files("videos"), 0);
    }

    #[tokio::test]
    async fn image_types_are_not_videos() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let project_id = project(&app, &token).await;

        let res = app
            .upload_with_token(
                routes::VIDEOS,
                "video",
                ("poster.png", "image/png", PNG_BYTES),
                &[("project_id", project_id.to_string())],
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(app.stored_files("videos"), 0);
    }

    #[tokio::test]
    async fn delete_removes_row_and_file() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let project_id = project(&app, &token).await;
        let id = app.upload_video(project_id, &token).await.asset_id();

        let res = app.delete_with_token(&routes::video(&id), &token).await;
        assert_eq!(res.status, 204);
        assert_eq!(app.stored_files("videos"), 0);

        let again = app.get_with_token(&routes::play_video(&id), &token).await;
        assert_eq!(again.status, 404);
    }
}
