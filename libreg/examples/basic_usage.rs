//! Basic usage example for the libreg library.
//!
//! Lists the tags of a repository together with the size and creation time
//! of each tag's image.
//!
//! Run with: cargo run --example basic_usage -- localhost:5000/alpine

use libreg::format::{format_rfc3339, format_size};
use libreg::oci::total_size;
use libreg::{Reference, RegistryBuilder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let name = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "localhost:5000/alpine".to_string());
    let reference: Reference = name.parse()?;

    let registry = RegistryBuilder::new(reference.domain())
        .force_non_ssl(reference.domain().starts_with("localhost"))
        .build()
        .await?;
    println!("Connected to {}\n", registry.url());

    let mut tags = registry.tags(reference.path()).await?;
    tags.sort();

    for tag in tags {
        let manifest = match registry.manifest_v2(reference.path(), &tag).await {
            Ok(manifest) => manifest,
            Err(e) => {
                eprintln!("{}: skipped ({})", tag, e);
                continue;
            }
        };
        let created = registry
            .tag_created_date(reference.path(), &tag)
            .await
            .ok()
            .flatten()
            .map(|c| format_rfc3339(&c))
            .unwrap_or_default();

        println!("{:<20} {:>10} {}", tag, format_size(total_size(&manifest)), created);
    }

    Ok(())
}
