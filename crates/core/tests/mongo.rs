//! Runs the repositories against a live MongoDB.
//!
//! Skipped unless `MONGO_URL` points at a server, e.g.
//! `MONGO_URL=mongodb://localhost:27017 cargo test -p gazette_core --test mongo`.
//! Every test works in a throwaway database that is dropped afterwards.

use std::sync::Arc;
use std::time::Duration;

use gazette_core::bson::doc;
use gazette_core::models::{ArticleChanges, NewArticle, NewCategory, NewComment};
use gazette_core::{
    ArticleFilters, Collection, CommentFilters, DocumentStore, Filter, FindQuery, MongoStore,
    Repositories,
};
use mongodb::Client;

async fn connect() -> Option<(Client, String, Arc<MongoStore>)> {
    let url = std::env::var("MONGO_URL").ok()?;
    if url.is_empty() || url.starts_with("memory://") {
        return None;
    }
    let client = Client::with_uri_str(&url).await.unwrap();
    let database = format!("gazette_test_{}", uuid::Uuid::new_v4().simple());
    let store = Arc::new(MongoStore::with_client(client.clone(), &database));
    store.ensure_indexes().await.unwrap();
    Some((client, database, store))
}

async fn cleanup(client: &Client, database: &str, store: &MongoStore) {
    client.database(database).drop().await.unwrap();
    store.close().await;
}

fn draft(title: &str, content: &str, category_id: &str) -> NewArticle {
    NewArticle {
        title: title.into(),
        content: content.into(),
        author: "Jean Mukendi".into(),
        category_id: category_id.into(),
        image_url: None,
        published: false,
    }
}

#[tokio::test]
async fn test_repositories_round_trip() {
    let Some((client, database, store)) = connect().await else {
        eprintln!("MONGO_URL not set, skipping");
        return;
    };
    let repos = Repositories::new(store.clone());

    let category = repos
        .categories
        .create(NewCategory {
            name: "Politique".into(),
            description: "Politique congolaise".into(),
            color: "#007FFF".into(),
        })
        .await
        .unwrap();
    assert_eq!(repos.categories.get_by_id(&category.id).await.unwrap(), category);

    let mut created = Vec::new();
    for (title, content) in [("Elections en RDC", "Premier tour"), ("Economie", "Le franc (CDF)")] {
        created.push(repos.articles.create(draft(title, content, &category.id)).await.unwrap());
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    assert_eq!(created[0].category_name.as_deref(), Some("Politique"));
    assert_eq!(repos.articles.get_by_id(&created[0].id).await.unwrap(), created[0]);

    let raw = store
        .find_one(Collection::Articles, &Filter::eq("id", created[0].id.as_str()))
        .await
        .unwrap()
        .unwrap();
    assert!(!raw.contains_key("_id"));

    let updated = repos
        .articles
        .update(
            &created[0].id,
            ArticleChanges {
                published: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.published);
    assert_eq!(updated.title, "Elections en RDC");
    assert!(updated.updated_at > created[0].updated_at);

    let all = repos.articles.list(&ArticleFilters::default()).await.unwrap();
    let titles: Vec<_> = all.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, ["Economie", "Elections en RDC"]);

    let found = repos
        .articles
        .list(&ArticleFilters {
            search: Some("(cdf".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 1);

    let published = repos
        .articles
        .list(&ArticleFilters {
            published_only: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(published.len(), 1);

    cleanup(&client, &database, &store).await;
}

#[tokio::test]
async fn test_cascade_and_approval() {
    let Some((client, database, store)) = connect().await else {
        eprintln!("MONGO_URL not set, skipping");
        return;
    };
    let repos = Repositories::new(store.clone());
    let article = repos
        .articles
        .create(draft("Léopards", "Victoire", "sport"))
        .await
        .unwrap();

    let mut comments = Vec::new();
    for content in ["Bravo", "Allez"] {
        let comment = repos
            .comments
            .create(NewComment {
                article_id: article.id.clone(),
                author: "Grace".into(),
                content: content.into(),
            })
            .await
            .unwrap();
        comments.push(comment);
    }
    repos.comments.approve(&comments[0].id).await.unwrap();

    let mut filters = CommentFilters::for_article(&article.id);
    filters.approved_only = true;
    let approved = repos.comments.list(&filters).await.unwrap();
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0].id, comments[0].id);

    repos.articles.delete(&article.id).await.unwrap();
    let left = repos
        .comments
        .list(&CommentFilters::for_article(&article.id))
        .await
        .unwrap();
    assert!(left.is_empty());
    assert!(repos.articles.get_by_id(&article.id).await.unwrap_err().is_not_found());

    cleanup(&client, &database, &store).await;
}

#[tokio::test]
async fn test_unique_ids_and_result_cap() {
    let Some((client, database, store)) = connect().await else {
        eprintln!("MONGO_URL not set, skipping");
        return;
    };
    store.ensure_indexes().await.unwrap();

    for n in 0..5 {
        store
            .insert_one(Collection::Categories, doc! { "id": format!("c{n}"), "rank": n })
            .await
            .unwrap();
    }
    let duplicate = store
        .insert_one(Collection::Categories, doc! { "id": "c0", "rank": 99 })
        .await;
    assert!(duplicate.is_err());

    let query = FindQuery::new(Filter::All).sort_desc("rank").limit(3);
    let top = store.find(Collection::Categories, &query).await.unwrap();
    let ranks: Vec<_> = top.iter().map(|d| d.get_i32("rank").unwrap()).collect();
    assert_eq!(ranks, [4, 3, 2]);

    let matched = store
        .update_one(Collection::Categories, &Filter::eq("id", "c1"), doc! { "rank": 10 })
        .await
        .unwrap();
    assert_eq!(matched, 1);
    let removed = store
        .delete_many(Collection::Categories, &Filter::All)
        .await
        .unwrap();
    assert_eq!(removed, 5);

    cleanup(&client, &database, &store).await;
}
