//! Starter catalog.
//!
//! A fresh database gets six products so the catalog is never empty on
//! first launch.

use rust_decimal::Decimal;

use huerto_core::{Price, ProductId};

use crate::db::{ProductRepository, RepositoryError};
use crate::models::Product;

struct Starter {
    name: &'static str,
    description: &'static str,
    price: i64,
    stock: i64,
    category: &'static str,
    origin: &'static str,
    image_url: &'static str,
}

const STARTERS: [Starter; 6] = [
    Starter {
        name: "Manzana Fuji",
        description: "Manzana roja y dulce",
        price: 1500,
        stock: 100,
        category: "Fruta",
        origin: "Chile",
        image_url: "https://plus.unsplash.com/premium_photo-1673544920963-840455e34582",
    },
    Starter {
        name: "Plátano",
        description: "Plátano maduro y listo para comer",
        price: 990,
        stock: 150,
        category: "Fruta",
        origin: "Ecuador",
        image_url: "https://images.pexels.com/photos/1093038/pexels-photo-1093038.jpeg",
    },
    Starter {
        name: "Lechuga Costina",
        description: "Lechuga fresca y crujiente",
        price: 800,
        stock: 200,
        category: "Verdura",
        origin: "Chile",
        image_url: "https://images.unsplash.com/photo-1557844039-b91d29311d75",
    },
    Starter {
        name: "Tomate Larga Vida",
        description: "Tomate ideal para ensaladas",
        price: 1200,
        stock: 120,
        category: "Verdura",
        origin: "Chile",
        image_url: "https://images.unsplash.com/photo-1582284540020-8acbe03f4924",
    },
    Starter {
        name: "Zanahoria",
        description: "Zanahoria fresca y llena de vitaminas",
        price: 700,
        stock: 180,
        category: "Verdura",
        origin: "Chile",
        image_url: "https://images.pexels.com/photos/1306559/pexels-photo-1306559.jpeg",
    },
    Starter {
        name: "Pimentón Rojo",
        description: "Pimentón rojo para cocinar",
        price: 1100,
        stock: 90,
        category: "Verdura",
        origin: "Chile",
        image_url: "https://images.pexels.com/photos/161556/tomatoes-vegetables-red-fresh-161556.jpeg",
    },
];

/// The starter products, unsaved, with fixed ids `1..=6` so reseeding
/// skips the ones already stored.
#[must_use]
pub fn initial_products() -> Vec<Product> {
    (1..)
        .zip(STARTERS)
        .map(|(id, s)| Product {
            id: ProductId::new(id),
            name: s.name.to_owned(),
            description: s.description.to_owned(),
            price: Price::clp(Decimal::from(s.price)),
            stock: s.stock,
            category: s.category.to_owned(),
            origin: s.origin.to_owned(),
            image_url: s.image_url.to_owned(),
        })
        .collect()
}

/// Insert the starter products if the catalog is empty.
///
/// Returns the number of products inserted (0 when the catalog already had
/// products).
///
/// # Errors
///
/// Returns `RepositoryError` if counting or inserting fails.
pub async fn seed_catalog_if_empty(products: &ProductRepository) -> Result<u64, RepositoryError> {
    if products.count().await? > 0 {
        return Ok(0);
    }

    let inserted = products.insert_initial(&initial_products()).await?;
    tracing::info!(inserted, "seeded starter catalog");
    Ok(inserted)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::testing;

    #[test]
    fn test_initial_products() {
        let products = initial_products();
        assert_eq!(products.len(), 6);
        let ids: Vec<i64> = products.iter().map(|p| p.id.as_i64()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);

        let first = products.first().unwrap();
        assert_eq!(first.name, "Manzana Fuji");
        assert_eq!(first.display_price(), "$1.500");

        let total_stock: i64 = products.iter().map(|p| p.stock).sum();
        assert_eq!(total_stock, 840);
    }

    #[tokio::test]
    async fn test_seed_only_when_empty() {
        let repo = ProductRepository::new(testing::pool().await);

        assert_eq!(seed_catalog_if_empty(&repo).await.unwrap(), 6);
        assert_eq!(seed_catalog_if_empty(&repo).await.unwrap(), 0);
        assert_eq!(repo.count().await.unwrap(), 6);

        let fruit = repo.list_by_category("Fruta").await.unwrap();
        assert_eq!(fruit.len(), 2);
    }

    #[tokio::test]
    async fn test_forced_reseed_keeps_one_copy() {
        let repo = ProductRepository::new(testing::pool().await);
        assert_eq!(seed_catalog_if_empty(&repo).await.unwrap(), 6);

        assert_eq!(repo.insert_initial(&initial_products()).await.unwrap(), 0);
        assert_eq!(repo.count().await.unwrap(), 6);

        // A deleted starter comes back, the others are left alone
        repo.delete(ProductId::new(2)).await.unwrap();
        assert_eq!(repo.insert_initial(&initial_products()).await.unwrap(), 1);
        assert_eq!(repo.count().await.unwrap(), 6);

        let created = repo
            .insert(&Product::draft("Kiwi", Price::clp(Decimal::from(900))))
            .await
            .unwrap();
        assert_eq!(created.id, ProductId::new(7));
    }
}
