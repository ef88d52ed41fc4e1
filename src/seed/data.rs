use anyhow::{Context, Result};
use serde_json::json;

use crate::logic::{CategoryOperations, CollectionOperations, ProductOperations};
use crate::model::{NewCategory, NewCollection, NewProduct, OneOrMany, UserContext};
use crate::store::traits::Store;

/// A demo collection: title, image, description and its categories with products
struct SeedCollection {
    title: &'static str,
    image: &'static str,
    description: &'static str,
    categories: &'static [SeedCategory],
}

struct SeedCategory {
    name: &'static str,
    image: &'static str,
    products: &'static [SeedProduct],
}

struct SeedProduct {
    name: &'static str,
    price: &'static str,
    sizes: &'static [&'static str],
    colors: &'static [&'static str],
    units_in_stock: i64,
}

const SEED_CATALOG: &[SeedCollection] = &[
    SeedCollection {
        title: "Summer Essentials",
        image: "https://images.example.com/collections/summer.jpg",
        description: "Light layers and accessories for warm days",
        categories: &[
            SeedCategory {
                name: "T-Shirts",
                image: "https://images.example.com/categories/t-shirts.jpg",
                products: &[
                    SeedProduct {
                        name: "Linen Crew Tee",
                        price: "29.90",
                        sizes: &["S", "M", "L", "XL"],
                        colors: &["white", "sand"],
                        units_in_stock: 120,
                    },
                    SeedProduct {
                        name: "Striped Pocket Tee",
                        price: "24.50",
                        sizes: &["M", "L"],
                        colors: &["navy"],
                        units_in_stock: 45,
                    },
                ],
            },
            SeedCategory {
                name: "Sunglasses",
                image: "https://images.example.com/categories/sunglasses.jpg",
                products: &[SeedProduct {
                    name: "Round Acetate Frames",
                    price: "89",
                    sizes: &[],
                    colors: &["tortoise", "black"],
                    units_in_stock: 30,
                }],
            },
        ],
    },
    SeedCollection {
        title: "Winter Outerwear",
        image: "https://images.example.com/collections/winter.jpg",
        description: "Coats and knitwear",
        categories: &[SeedCategory {
            name: "Coats",
            image: "https://images.example.com/categories/coats.jpg",
            products: &[SeedProduct {
                name: "Wool Overcoat",
                price: "349.00",
                sizes: &["M", "L"],
                colors: &["charcoal", "camel"],
                units_in_stock: 12,
            }],
        }],
    },
];

fn strings(values: &[&str]) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().map(|v| v.to_string()).collect())
    }
}

/// Load a small demo catalog through the domain operations.
/// Does nothing if the store already holds the first seed collection.
pub async fn load_seed_data<S: Store>(store: &S) -> Result<()> {
    let user = UserContext::system();

    if let Some(first) = SEED_CATALOG.first() {
        if store.find_collection_by_title(first.title).await?.is_some() {
            log::info!("Seed data already present, skipping");
            return Ok(());
        }
    }

    let mut product_count = 0;
    for seed_collection in SEED_CATALOG {
        let collection = CollectionOperations::create(
            store,
            &user,
            NewCollection {
                title: Some(seed_collection.title.to_string()),
                description: Some(seed_collection.description.to_string()),
                image: Some(seed_collection.image.to_string()),
                categories: None,
            },
        )
        .await
        .with_context(|| format!("Failed to seed collection '{}'", seed_collection.title))?;

        for seed_category in seed_collection.categories {
            let category = CategoryOperations::create(
                store,
                &user,
                &collection.id,
                NewCategory {
                    name: Some(seed_category.name.to_string()),
                    description: None,
                    image: Some(seed_category.image.to_string()),
                },
            )
            .await
            .with_context(|| format!("Failed to seed category '{}'", seed_category.name))?;

            for seed_product in seed_category.products {
                ProductOperations::create(
                    store,
                    &user,
                    NewProduct {
                        name: Some(seed_product.name.to_string()),
                        description: Some(format!("{} from the {} range", seed_product.name, collection.title)),
                        media: Some(vec![format!(
                            "https://images.example.com/products/{}.jpg",
                            seed_product.name.to_lowercase().replace(' ', "-")
                        )]),
                        price: Some(json!(seed_product.price)),
                        sizes: strings(seed_product.sizes),
                        colors: strings(seed_product.colors),
                        units_in_stock: Some(seed_product.units_in_stock),
                        dimensions: None,
                        categories: Some(OneOrMany::One(category.id.clone())),
                        collections: Some(OneOrMany::One(collection.id.clone())),
                    },
                )
                .await
                .with_context(|| format!("Failed to seed product '{}'", seed_product.name))?;
                product_count += 1;
            }
        }
    }

    log::info!(
        "Seed data loaded: {} collections, {} products",
        SEED_CATALOG.len(),
        product_count
    );
    Ok(())
}
