//! Demo catalog seeding.
//!
//! Idempotent by slug: categories and products that already exist are
//! skipped, so re-running against a populated database is safe.

use rust_decimal::Decimal;

use stitchpress_core::CategoryId;
use stitchpress_server::models::{NewBanner, NewCategory, NewProduct};
use stitchpress_server::store::{Store, StoreError};

use super::{CommandError, connect};

struct SeedProduct {
    slug: &'static str,
    name: &'static str,
    description: &'static str,
    price: i64,
    original_price: Option<i64>,
    category: &'static str,
}

const CATEGORIES: &[(&str, &str)] = &[
    ("t-shirts", "T-Shirts"),
    ("hoodies", "Hoodies"),
    ("caps", "Caps"),
];

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        slug: "classic-crew-tee",
        name: "Classic Crew Tee",
        description: "Midweight cotton crew neck, ready for a custom print.",
        price: 450,
        original_price: Some(550),
        category: "t-shirts",
    },
    SeedProduct {
        slug: "heavy-oversize-tee",
        name: "Heavy Oversize Tee",
        description: "240gsm oversize fit with a drop shoulder.",
        price: 600,
        original_price: None,
        category: "t-shirts",
    },
    SeedProduct {
        slug: "fleece-pullover-hoodie",
        name: "Fleece Pullover Hoodie",
        description: "Brushed fleece, kangaroo pocket, double-lined hood.",
        price: 1200,
        original_price: Some(1500),
        category: "hoodies",
    },
    SeedProduct {
        slug: "snapback-cap",
        name: "Snapback Cap",
        description: "Structured six-panel snapback, flat brim.",
        price: 350,
        original_price: None,
        category: "caps",
    },
];

pub async fn run() -> Result<(), CommandError> {
    let store = connect().await?;

    let mut created = 0_u32;
    for (slug, name) in CATEGORIES {
        match store
            .create_category(NewCategory {
                slug: (*slug).to_owned(),
                name: (*name).to_owned(),
                image: None,
            })
            .await
        {
            Ok(_) => created += 1,
            Err(StoreError::Conflict(_)) => {
                tracing::debug!(slug, "Category exists, skipping");
            }
            Err(e) => return Err(e.into()),
        }
    }

    for seed in PRODUCTS {
        let category_id = category_id(&store, seed.category).await?;
        match store
            .create_product(NewProduct {
                slug: seed.slug.to_owned(),
                name: seed.name.to_owned(),
                description: seed.description.to_owned(),
                price: Decimal::new(seed.price, 0),
                original_price: seed.original_price.map(|p| Decimal::new(p, 0)),
                category_id,
                images: vec![format!("/api/images/{}.png", seed.slug)],
                sizes: vec!["S".to_owned(), "M".to_owned(), "L".to_owned(), "XL".to_owned()],
                colors: vec!["black".to_owned(), "white".to_owned(), "navy".to_owned()],
                inventory: 50,
                rating: 0.0,
                is_active: true,
            })
            .await
        {
            Ok(_) => created += 1,
            Err(StoreError::Conflict(_)) => {
                tracing::debug!(slug = seed.slug, "Product exists, skipping");
            }
            Err(e) => return Err(e.into()),
        }
    }

    if store.list_banners(false).await?.is_empty() {
        store
            .create_banner(NewBanner {
                title: "Design your own".to_owned(),
                image_url: "/api/images/banner-custom.png".to_owned(),
                link: Some("/customize".to_owned()),
                position: 0,
                is_active: true,
            })
            .await?;
        created += 1;
    }

    tracing::info!(created, "Seeding complete");
    Ok(())
}

async fn category_id(
    store: &dyn Store,
    slug: &str,
) -> Result<Option<CategoryId>, CommandError> {
    Ok(store.category_by_slug(slug).await?.map(|c| c.id))
}
