use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::handlers::asset::upload_body_limit;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(role_routes())
        .merge(lookup_routes())
        .merge(project_routes(config))
        .merge(image_routes(config))
        .merge(video_routes(config))
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::sign_in))
        .routes(routes!(handlers::auth::refresh))
        .routes(routes!(handlers::auth::logout))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::user::register, handlers::user::list_users))
        .routes(routes!(
            handlers::user::get_profile,
            handlers::user::update_profile,
            handlers::user::delete_profile
        ))
        .routes(routes!(handlers::user::change_password))
        .routes(routes!(
            handlers::user::get_user,
            handlers::user::update_user,
            handlers::user::delete_user
        ))
}

fn role_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::role::list_roles, handlers::role::create_role))
        .routes(routes!(
            handlers::role::get_role,
            handlers::role::update_role,
            handlers::role::delete_role
        ))
}

fn lookup_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::genre::list_genres, handlers::genre::create_genre))
        .routes(routes!(
            handlers::genre::get_genre,
            handlers::genre::update_genre,
            handlers::genre::delete_genre
        ))
        .routes(routes!(
            handlers::age_category::list_age_categories,
            handlers::age_category::create_age_category
        ))
        .routes(routes!(
            handlers::age_category::get_age_category,
            handlers::age_category::update_age_category,
            handlers::age_category::delete_age_category
        ))
        .routes(routes!(
            handlers::project_type::list_types,
            handlers::project_type::create_type
        ))
        .routes(routes!(
            handlers::project_type::get_type,
            handlers::project_type::update_type,
            handlers::project_type::delete_type
        ))
}

fn project_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let crud = OpenApiRouter::new()
        .routes(routes!(
            handlers::project::list_projects,
            handlers::project::create_project
        ))
        .routes(routes!(handlers::project::search_projects))
        .routes(routes!(
            handlers::project::get_project,
            handlers::project::update_project
        ));

    let cover = OpenApiRouter::new()
        .routes(routes!(
            handlers::project::upload_cover,
            handlers::project::set_cover
        ))
        .layer(upload_body_limit(config.storage.max_image_size));

    crud.merge(cover)
}

fn image_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let upload = OpenApiRouter::new()
        .routes(routes!(handlers::image::upload_image))
        .layer(upload_body_limit(config.storage.max_image_size));

    OpenApiRouter::new()
        .routes(routes!(
            handlers::image::download_image,
            handlers::image::delete_image
        ))
        .routes(routes!(handlers::image::show_image))
        .merge(upload)
}

fn video_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let upload = OpenApiRouter::new()
        .routes(routes!(handlers::video::upload_video))
        .layer(upload_body_limit(config.storage.max_video_size));

    OpenApiRouter::new()
        .routes(routes!(
            handlers::video::download_video,
            handlers::video::delete_video
        ))
        .routes(routes!(handlers::video::play_video))
        .merge(upload)
}
