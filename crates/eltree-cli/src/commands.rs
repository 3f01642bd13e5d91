use std::fs;
use std::io::{self, Write};

use anyhow::Context;
use colored::Colorize;
use eltree_nav::{import_subtree, MemoryDocument, Navigator, NodeType, TreeNavigator};
use eltree_store::{Database, ReadTransaction, ReadTxn};
use eltree_tree::{document_names, Node, TreeError};
use serde_json::json;
use tracing::debug;

use crate::cli::*;
use crate::config::CliConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::load(cli.config.as_deref())?;
    let store = config.store_config(cli.db);
    debug!(?store, "opening store");
    let db = Database::open(store).context("opening store")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let format = cli.format;
    match cli.command {
        Command::Import(args) => cmd_import(&db, &args, format, &mut out),
        Command::Render(args) => cmd_render(&db, &args, format, &mut out),
        Command::Text(args) => cmd_text(&db, &args, format, &mut out),
        Command::Ls => cmd_ls(&db, format, &mut out),
        Command::Tree(args) => cmd_tree(&db, &args, format, &mut out),
    }
}

fn open_document<T: ReadTxn + ?Sized>(txn: &T, name: &str) -> anyhow::Result<Node> {
    Node::open_root(txn, name.as_bytes()).with_context(|| format!("opening document {name}"))
}

fn cmd_import<W: Write>(db: &Database, args: &ImportArgs, format: OutputFormat, out: &mut W) -> anyhow::Result<()> {
    let markup = fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let doc = MemoryDocument::parse(&markup)
        .with_context(|| format!("parsing {}", args.file.display()))?;

    let stats = db.update(|txn| -> anyhow::Result<_> {
        let root = Node::create_root(txn, args.name.as_bytes())
            .with_context(|| format!("creating document {}", args.name))?;
        let stats = import_subtree(txn, &root, &mut doc.navigator())
            .with_context(|| format!("importing {}", args.file.display()))?;
        Ok(stats)
    })?;

    match format {
        OutputFormat::Text => writeln!(
            out,
            "{} Imported {} ({} nodes, {} attributes)",
            "✓".green().bold(),
            args.name.yellow(),
            stats.nodes,
            stats.attributes,
        )?,
        OutputFormat::Json => writeln!(
            out,
            "{}",
            json!({
                "document": args.name,
                "nodes": stats.nodes,
                "attributes": stats.attributes,
            })
        )?,
    }
    Ok(())
}

fn cmd_render<W: Write>(db: &Database, args: &DocArgs, format: OutputFormat, out: &mut W) -> anyhow::Result<()> {
    let markup = db.view(|txn| -> anyhow::Result<_> {
        let root = open_document(txn, &args.name)?;
        Ok(root.markup(txn)?)
    })?;
    write_content(out, &args.name, "markup", &markup, format)
}

fn cmd_text<W: Write>(db: &Database, args: &DocArgs, format: OutputFormat, out: &mut W) -> anyhow::Result<()> {
    let text = db.view(|txn| -> anyhow::Result<_> {
        let root = open_document(txn, &args.name)?;
        Ok(root.text_content(txn)?)
    })?;
    write_content(out, &args.name, "text", &text, format)
}

fn write_content<W: Write>(
    out: &mut W,
    name: &str,
    field: &str,
    content: &[u8],
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            out.write_all(content)?;
            writeln!(out)?;
        }
        OutputFormat::Json => {
            let content = String::from_utf8_lossy(content);
            writeln!(out, "{}", json!({ "document": name, field: content }))?;
        }
    }
    Ok(())
}

fn cmd_ls<W: Write>(db: &Database, format: OutputFormat, out: &mut W) -> anyhow::Result<()> {
    let names: Vec<String> = db
        .view(|txn| document_names(txn))?
        .iter()
        .map(|name| String::from_utf8_lossy(name).into_owned())
        .collect();

    match format {
        OutputFormat::Text if names.is_empty() => writeln!(out, "No documents.")?,
        OutputFormat::Text => {
            for name in &names {
                writeln!(out, "{}", name.yellow())?;
            }
        }
        OutputFormat::Json => writeln!(out, "{}", json!(names))?,
    }
    Ok(())
}

/// One line of a document outline.
struct OutlineEntry {
    depth: usize,
    node_type: NodeType,
    name: String,
    index: u64,
    value: Option<String>,
}

fn qualified(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_owned()
    } else {
        format!("{prefix}:{local}")
    }
}

fn outline(
    nav: &mut TreeNavigator<'_, ReadTransaction>,
    depth: usize,
    entries: &mut Vec<OutlineEntry>,
) -> Result<(), TreeError> {
    let node_type = nav.node_type();
    let value = match node_type {
        NodeType::Text | NodeType::Comment => Some(nav.current().value(nav.txn())?),
        _ => None,
    };
    entries.push(OutlineEntry {
        depth,
        node_type,
        name: qualified(nav.prefix(), nav.local_name()),
        index: nav.current().index(),
        value: value.map(|v| String::from_utf8_lossy(&v).into_owned()),
    });

    if node_type == NodeType::Element {
        let mut visited = false;
        while nav.move_to_next_attribute()? {
            visited = true;
            entries.push(OutlineEntry {
                depth: depth + 1,
                node_type: NodeType::Attribute,
                name: qualified(nav.prefix(), nav.local_name()),
                index: nav.attribute_index().unwrap_or_default(),
                value: Some(nav.value()?),
            });
        }
        if visited {
            nav.move_to_parent()?;
        }
    }

    if nav.move_to_child()? {
        loop {
            outline(nav, depth + 1, entries)?;
            if !nav.move_to_next()? {
                break;
            }
        }
        nav.move_to_parent()?;
    }
    Ok(())
}

fn cmd_tree<W: Write>(db: &Database, args: &DocArgs, format: OutputFormat, out: &mut W) -> anyhow::Result<()> {
    let entries = db.view(|txn| -> anyhow::Result<_> {
        let root = open_document(txn, &args.name)?;
        let mut nav = TreeNavigator::new(txn, root);
        let mut entries = Vec::new();
        outline(&mut nav, 0, &mut entries)?;
        Ok(entries)
    })?;

    match format {
        OutputFormat::Text => {
            for entry in &entries {
                let indent = "  ".repeat(entry.depth);
                let kind = entry.node_type.to_string();
                let kind = match entry.node_type {
                    NodeType::Root => kind.magenta(),
                    NodeType::Element => kind.cyan(),
                    NodeType::Attribute => kind.blue(),
                    NodeType::Text | NodeType::Comment => kind.dimmed(),
                };
                write!(out, "{indent}{kind} {}", format!("#{}", entry.index).dimmed())?;
                if !entry.name.is_empty() {
                    write!(out, " {}", entry.name.bold())?;
                }
                if let Some(value) = &entry.value {
                    write!(out, " {value:?}")?;
                }
                writeln!(out)?;
            }
        }
        OutputFormat::Json => {
            let rows: Vec<_> = entries
                .iter()
                .map(|e| {
                    json!({
                        "depth": e.depth,
                        "type": e.node_type.to_string(),
                        "name": e.name,
                        "index": e.index,
                        "value": e.value,
                    })
                })
                .collect();
            writeln!(out, "{}", serde_json::Value::Array(rows))?;
        }
    }
    Ok(())
}
