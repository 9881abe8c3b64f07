//! `reg tags`: list the tags of a repository.

use crate::context::{AppContext, VerbosityLevel};
use crate::format;
use clap::Args;
use libreg::tags::{TagEntry, TagEvent, collect_entries, plain_listing, sort_entries};
use libreg::{
    CredentialStore, Credentials, DockerConfigStore, Reference, Registry, RegistryBuilder,
    TagSource,
};
use tabled::Tabled;

#[cfg(test)]
#[path = "tags_tests.rs"]
mod tests;

/// Arguments of the tags command
#[derive(Args, Debug)]
pub struct TagsArgs {
    /// Repository to list; a tag or digest in the reference is ignored
    #[arg(value_name = "NAME[:TAG|@DIGEST]")]
    pub name: String,

    /// Show compressed size, last layer and creation time of each tag
    #[arg(short, long)]
    pub verbose: bool,
}

/// Table row for one tag entry
#[derive(Debug, Tabled)]
struct TagRow<'a> {
    #[tabled(rename = "tag")]
    tag: &'a str,
    #[tabled(rename = "compressed")]
    compressed: &'a str,
    #[tabled(rename = "last layer")]
    last_layer: &'a str,
    #[tabled(rename = "created")]
    created: &'a str,
}

impl<'a> From<&'a TagEntry> for TagRow<'a> {
    fn from(entry: &'a TagEntry) -> Self {
        Self {
            tag: &entry.tag,
            compressed: &entry.compressed,
            last_layer: &entry.last_layer,
            created: &entry.created,
        }
    }
}

/// Handle the tags command
pub async fn handle_tags(ctx: &AppContext, args: &TagsArgs) -> libreg::Result<()> {
    let reference: Reference = args.name.parse()?;
    format::print(
        ctx,
        VerbosityLevel::Verbose,
        &format!(
            "Listing tags for {} on {}",
            reference.path(),
            reference.domain()
        ),
    );

    let registry = connect(ctx, &reference).await?;
    let output = list_tags(ctx, &registry, reference.path(), args.verbose).await?;

    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}

/// Produces the command output for a repository.
///
/// Only the tag list request can fail; per-tag problems are reported as
/// warnings or debug messages.
pub async fn list_tags<S: TagSource>(
    ctx: &AppContext,
    source: &S,
    repository: &str,
    verbose: bool,
) -> libreg::Result<String> {
    let tags = source.list_tags(repository).await?;
    format::print(
        ctx,
        VerbosityLevel::Verbose,
        &format!("Found {} tags", tags.len()),
    );

    if !verbose {
        return Ok(plain_listing(tags));
    }

    let pb = format::progress_bar(ctx, tags.len() as u64, "Fetching manifests");
    let mut entries = collect_entries(source, repository, &tags, |event| match event {
        TagEvent::Skipped { tag, error } => pb.suspend(|| {
            format::warning(
                ctx,
                &format!("could not fetch manifest for tag '{}': {}", tag, error),
            )
        }),
        TagEvent::CreatedUnavailable { tag, error } => pb.suspend(|| {
            format::print(
                ctx,
                VerbosityLevel::VeryVerbose,
                &format!("no creation date for tag '{}': {}", tag, error),
            )
        }),
        TagEvent::Done => pb.inc(1),
    })
    .await;
    format::finish_progress(ctx, pb);

    sort_entries(&mut entries);
    Ok(render_table(&entries))
}

/// Renders entries as a left-aligned table, columns separated by at least
/// one space, without trailing whitespace.
pub fn render_table(entries: &[TagEntry]) -> String {
    use tabled::{
        Table,
        settings::{Padding, Style},
    };

    let rows: Vec<TagRow<'_>> = entries.iter().map(TagRow::from).collect();
    let table = Table::new(rows)
        .with(Style::empty())
        .with(Padding::new(0, 1, 0, 0))
        .to_string();

    table
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

async fn connect(ctx: &AppContext, reference: &Reference) -> libreg::Result<Registry> {
    let network = &ctx.config.network;
    let mut builder = RegistryBuilder::new(reference.domain())
        .insecure(network.insecure)
        .force_non_ssl(network.force_non_ssl)
        .skip_ping(network.skip_ping)
        .timeout(network.timeout);

    if let Some(credentials) = resolve_credentials(ctx, reference.domain()) {
        builder = builder.with_credentials(credentials);
    }

    let registry = builder.build().await?;
    format::print(
        ctx,
        VerbosityLevel::Verbose,
        &format!("Connected to {}", registry.url()),
    );
    Ok(registry)
}

/// CLI credentials first, then the Docker client config.
fn resolve_credentials(ctx: &AppContext, domain: &str) -> Option<Credentials> {
    if let Some(credentials) = ctx.cli_credentials() {
        return Some(credentials);
    }

    let lookup = DockerConfigStore::from_default_location().and_then(|store| {
        format::print(
            ctx,
            VerbosityLevel::VeryVerbose,
            &format!("Reading credentials from {}", store.path().display()),
        );
        store.get(domain)
    });

    match lookup {
        Ok(credentials) => credentials,
        Err(e) => {
            format::print(
                ctx,
                VerbosityLevel::VeryVerbose,
                &format!("Ignoring stored credentials: {}", e),
            );
            None
        }
    }
}
