use clap::{Parser, Subcommand, ValueEnum};
use contentdb::record::{AuthorMeta, CategoryMeta, MediaMeta, PageMeta, PostMeta};
use contentdb::site::validate_content_root;
use contentdb::{
    ContentDb, EntityKind, EntityMeta, Filters, PageRequest, RecordPatch, Repository, SearchQuery,
    SortDirection, SortField, SortSpec,
};
use std::path::{Path, PathBuf};
use std::process;

/// contentdb CLI — inspect and mutate a content root from the command line
#[derive(Parser)]
#[command(name = "contentdb", version, about)]
struct Cli {
    /// Content root directory (default: discovered by walking up from the
    /// current directory until a content/ folder is found)
    #[arg(long)]
    content_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "yaml")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Get a single record by slug
    Get {
        /// Entity kind (page, post, author, category, media)
        kind: EntityKind,
        /// Record slug
        slug: String,
    },

    /// List records, optionally filtered, sorted, and paginated
    List {
        /// Entity kind
        kind: EntityKind,
        /// Match records carrying any of these tags
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Case-insensitive substring over the kind's text fields
        #[arg(long)]
        search: Option<String>,
        /// Minimum size in bytes (media only)
        #[arg(long)]
        min_size: Option<u64>,
        /// Maximum size in bytes (media only)
        #[arg(long)]
        max_size: Option<u64>,
        /// Sort field (date, title, size, created)
        #[arg(long)]
        sort: Option<SortField>,
        /// Sort direction
        #[arg(long, default_value = "desc")]
        direction: SortDirection,
        /// 1-based page number; enables paginated output
        #[arg(long)]
        page: Option<i64>,
        /// Records per page
        #[arg(long, default_value_t = 10)]
        page_size: i64,
    },

    /// Create a new record
    Create {
        /// Entity kind
        kind: EntityKind,
        /// Slug (default: derived from the title)
        #[arg(long)]
        slug: Option<String>,
        /// Frontmatter values (e.g. --field title="Hello World")
        #[arg(long = "field", value_parser = parse_key_value)]
        fields: Vec<(String, String)>,
        /// Read body content from a file
        #[arg(long)]
        content_file: Option<String>,
        /// Read body content from stdin
        #[arg(long)]
        content_stdin: bool,
    },

    /// Update an existing record (any subset of fields, body, and slug)
    Update {
        /// Entity kind
        kind: EntityKind,
        /// Record slug
        slug: String,
        /// Move the record to a new slug
        #[arg(long)]
        new_slug: Option<String>,
        /// Frontmatter values to merge (e.g. --field title="New Title")
        #[arg(long = "field", value_parser = parse_key_value)]
        fields: Vec<(String, String)>,
        /// Replace body content from a file
        #[arg(long)]
        content_file: Option<String>,
        /// Replace body content from stdin
        #[arg(long)]
        content_stdin: bool,
    },

    /// Delete a record
    Delete {
        /// Entity kind
        kind: EntityKind,
        /// Record slug
        slug: String,
    },

    /// Ranked full-text search across kinds
    Search {
        /// Free-text query
        query: String,
        /// Restrict to these kinds
        #[arg(long = "kind")]
        kinds: Vec<EntityKind>,
        /// Maximum number of results
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Check every record file against its kind's schema
    Validate,

    /// Render a record's body to HTML
    Render {
        /// Entity kind
        kind: EntityKind,
        /// Record slug
        slug: String,
    },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("Invalid key=value pair: no '=' found in '{s}'"))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

type CliError = Box<dyn std::error::Error>;

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("ERROR: {e}");
        process::exit(1);
    }
}

/// Pick the typed repository matching a runtime entity kind.
macro_rules! dispatch {
    ($kind:expr, $f:ident $(, $arg:expr)*) => {
        match $kind {
            EntityKind::Page => $f::<PageMeta>($($arg),*)?,
            EntityKind::Post => $f::<PostMeta>($($arg),*)?,
            EntityKind::Author => $f::<AuthorMeta>($($arg),*)?,
            EntityKind::Category => $f::<CategoryMeta>($($arg),*)?,
            EntityKind::Media => $f::<MediaMeta>($($arg),*)?,
        }
    };
}

fn run(cli: Cli) -> Result<(), CliError> {
    let cwd = std::env::current_dir()?;
    let root = match &cli.content_dir {
        Some(dir) => dir.clone(),
        None => contentdb::store::resolve_content_root(&cwd),
    };

    let output = match cli.command {
        Command::Get { kind, slug } => dispatch!(kind, cmd_get, &root, &slug),

        Command::List {
            kind,
            tags,
            search,
            min_size,
            max_size,
            sort,
            direction,
            page,
            page_size,
        } => {
            let filters = Filters {
                tags: if tags.is_empty() { None } else { Some(tags) },
                search,
                min_size,
                max_size,
            };
            let sort = sort.map(|field| SortSpec::new(field, direction));
            let page = page.map(|p| PageRequest::new(p, page_size));
            dispatch!(kind, cmd_list, &root, &filters, sort.as_ref(), page)
        }

        Command::Create {
            kind,
            slug,
            fields,
            content_file,
            content_stdin,
        } => {
            let body = read_content(content_file, content_stdin)?.unwrap_or_default();
            dispatch!(kind, cmd_create, &root, slug.as_deref(), &fields, &body)
        }

        Command::Update {
            kind,
            slug,
            new_slug,
            fields,
            content_file,
            content_stdin,
        } => {
            let body = read_content(content_file, content_stdin)?;
            dispatch!(
                kind,
                cmd_update,
                &root,
                &slug,
                new_slug.as_deref(),
                &fields,
                body
            )
        }

        Command::Delete { kind, slug } => dispatch!(kind, cmd_delete, &root, &slug),

        Command::Search {
            query,
            kinds,
            limit,
        } => {
            let db = ContentDb::open(&root);
            let request = SearchQuery {
                query,
                kinds: if kinds.is_empty() { None } else { Some(kinds) },
                limit,
            };
            serde_json::to_value(db.search(&request))?
        }

        Command::Validate => serde_json::to_value(validate_content_root(&root)?)?,

        Command::Render { kind, slug } => dispatch!(kind, cmd_render, &root, &slug),
    };

    print_output(&output, &cli.format);
    Ok(())
}

fn cmd_get<M: EntityMeta>(root: &Path, slug: &str) -> Result<serde_json::Value, CliError> {
    let repo: Repository<M> = Repository::open(root);
    let record = repo.get(slug)?;
    Ok(serde_json::to_value(record)?)
}

fn cmd_list<M: EntityMeta>(
    root: &Path,
    filters: &Filters,
    sort: Option<&SortSpec>,
    page: Option<PageRequest>,
) -> Result<serde_json::Value, CliError> {
    let repo: Repository<M> = Repository::open(root);
    match page {
        Some(request) => {
            let page = repo.find_with_pagination(filters, sort, &request);
            Ok(serde_json::json!({
                "items": page.items,
                "total": page.total,
                "hasMore": page.has_more,
            }))
        }
        None => {
            let records = repo.find_with_filters(filters, sort);
            Ok(serde_json::json!({ "items": records }))
        }
    }
}

fn cmd_create<M: EntityMeta>(
    root: &Path,
    slug: Option<&str>,
    fields: &[(String, String)],
    body: &str,
) -> Result<serde_json::Value, CliError> {
    let repo: Repository<M> = Repository::open(root);
    let meta: M = meta_from_fields(fields)?;
    let slug = repo.create(slug, meta, body)?;
    Ok(serde_json::json!({ "slug": slug }))
}

fn cmd_update<M: EntityMeta>(
    root: &Path,
    slug: &str,
    new_slug: Option<&str>,
    fields: &[(String, String)],
    body: Option<String>,
) -> Result<serde_json::Value, CliError> {
    let repo: Repository<M> = Repository::open(root);

    let mut patch = RecordPatch::<M>::new();
    patch.slug = new_slug.map(ToString::to_string);
    patch.body = body;
    if !fields.is_empty() {
        // merge supplied fields into the existing frontmatter
        let existing = repo.get(slug)?;
        let mut merged = serde_yaml::to_value(&existing.meta)?;
        if let Some(mapping) = merged.as_mapping_mut() {
            for (key, raw) in fields {
                mapping.insert(
                    serde_yaml::Value::String(key.clone()),
                    parse_field_value(raw),
                );
            }
        }
        patch.meta = Some(decode_meta(merged)?);
    }

    let outcome = repo.update(slug, patch)?;
    Ok(serde_json::json!({ "slug": outcome.slug, "renamed": outcome.renamed }))
}

fn cmd_delete<M: EntityMeta>(root: &Path, slug: &str) -> Result<serde_json::Value, CliError> {
    let repo: Repository<M> = Repository::open(root);
    repo.delete(slug)?;
    Ok(serde_json::json!({ "ok": true, "deleted": slug }))
}

fn cmd_render<M: EntityMeta>(root: &Path, slug: &str) -> Result<serde_json::Value, CliError> {
    let repo: Repository<M> = Repository::open(root);
    let record = repo.get(slug)?;
    Ok(serde_json::json!({
        "slug": record.slug,
        "html": record.html.unwrap_or_default(),
    }))
}

fn meta_from_fields<M: EntityMeta>(fields: &[(String, String)]) -> Result<M, CliError> {
    let mut mapping = serde_yaml::Mapping::new();
    for (key, raw) in fields {
        mapping.insert(
            serde_yaml::Value::String(key.clone()),
            parse_field_value(raw),
        );
    }
    decode_meta(serde_yaml::Value::Mapping(mapping))
}

fn decode_meta<M: EntityMeta>(mut value: serde_yaml::Value) -> Result<M, CliError> {
    contentdb::validation::validate_metadata(M::KIND, &mut value)?;
    Ok(serde_yaml::from_value(value)?)
}

/// Parse a field value as YAML (numbers, booleans, lists) falling back to
/// a plain string.
fn parse_field_value(raw: &str) -> serde_yaml::Value {
    serde_yaml::from_str(raw).unwrap_or(serde_yaml::Value::String(raw.to_string()))
}

fn print_output(value: &serde_json::Value, format: &OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).unwrap());
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(value).unwrap());
        }
    }
}

fn read_content(
    content_file: Option<String>,
    content_stdin: bool,
) -> Result<Option<String>, CliError> {
    if let Some(path) = content_file {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read content file '{path}': {e}"))?;
        Ok(Some(content))
    } else if content_stdin {
        use std::io::Read;
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        Ok(Some(content))
    } else {
        Ok(None)
    }
}
