use sea_orm::EntityTrait;

use ozinshe_server::entity::project;
use ozinshe_server::repository::project::{
    ProjectWrite, create_project, get_project, update_project,
};

use crate::common::{TestApp, routes};

fn write(title: &str, type_id: i32, genre_ids: Vec<i32>, age_category_ids: Vec<i32>) -> ProjectWrite {
    ProjectWrite {
        title: title.to_string(),
        description: String::new(),
        type_id,
        duration_in_mins: 45,
        release_year: 2019,
        director: String::new(),
        producer: String::new(),
        keywords: String::new(),
        genre_ids,
        age_category_ids,
    }
}

async fn lookups(app: &TestApp, path: &str, count: usize, token: &str) -> Vec<i32> {
    let mut ids = Vec::with_capacity(count);
    for n in 0..count {
        ids.push(app.create_lookup(path, &format!("entry {n}"), token).await);
    }
    ids
}

#[tokio::test]
async fn update_replaces_the_genre_set_exactly() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let type_id = app.create_lookup(routes::TYPES, "Series", &token).await;
    let genres = lookups(&app, routes::GENRES, 4, &token).await;

    let id = create_project(&app.db, &write("Saga", type_id, genres[..3].to_vec(), vec![]))
        .await
        .unwrap();
    update_project(&app.db, id, &write("Saga", type_id, vec![genres[3]], vec![]))
        .await
        .unwrap();

    let view = get_project(&app.db, id).await.unwrap();
    let held: Vec<i32> = view.genres.iter().map(|g| g.id).collect();
    assert_eq!(held, vec![genres[3]]);
}

#[tokio::test]
async fn failed_update_rolls_back_scalars_and_links() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let type_id = app.create_lookup(routes::TYPES, "Series", &token).await;
    let ages = lookups(&app, routes::AGE_CATEGORIES, 1, &token).await;

    let id = create_project(&app.db, &write("Before", type_id, vec![], ages.clone()))
        .await
        .unwrap();

    let result = update_project(&app.db, id, &write("After", type_id, vec![], vec![ages[0], 999])).await;
    assert!(result.is_err());

    let stored = project::Entity::find_by_id(id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.title, "Before");

    let view = get_project(&app.db, id).await.unwrap();
    let held: Vec<i32> = view.age_categories.iter().map(|a| a.id).collect();
    assert_eq!(held, ages);
}

#[tokio::test]
async fn failed_create_leaves_no_project() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let type_id = app.create_lookup(routes::TYPES, "Series", &token).await;

    let result = create_project(&app.db, &write("Orphan", type_id, vec![999], vec![])).await;
    assert!(result.is_err());

    let all = project::Entity::find().all(&app.db).await.unwrap();
    assert!(all.is_empty());
}
