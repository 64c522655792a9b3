// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
pub mod disjoint_set;
pub mod error;
pub mod hash_table;
pub mod key;

pub use disjoint_set::DisjointSet;
pub use error::{Error, Result};
pub use hash_table::{ChainedHashTable, ChainingConfig, ProbingConfig, ProbingHashTable};
pub use key::Key;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Merge elements and print the representative of each queried one.
    DisjointSet {
        #[arg(short, long, num_args = 1.., required = true)]
        elements: Vec<String>,
        /// Pair to merge, written `a:b`.
        #[arg(short, long = "union", value_parser = parse_pair)]
        unions: Vec<(String, String)>,
        #[arg(short, long)]
        find: Vec<String>,
    },
    /// Run `set:k=v`, `get:k` and `remove:k` operations against a table.
    Table {
        #[arg(short, long, value_enum, default_value_t = Strategy::Chaining)]
        strategy: Strategy,
        #[arg(short, long)]
        capacity: Option<usize>,
        #[arg(short = 'l', long)]
        max_load: Option<f64>,
        #[arg(short, long = "op", value_parser = parse_op)]
        ops: Vec<TableOp>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Strategy {
    Chaining,
    OpenAddressing,
}

#[derive(Clone, Debug, PartialEq)]
enum TableOp {
    Set(Key, String),
    Get(Key),
    Remove(Key),
}

fn parse_key(s: &str) -> Key {
    match s.parse() {
        Ok(key) => key,
        Err(never) => match never {},
    }
}

fn parse_pair(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once(':') {
        Some((a, b)) if !a.is_empty() && !b.is_empty() => Ok((a.to_string(), b.to_string())),
        _ => Err(format!("expected `a:b`, got '{s}'")),
    }
}

fn parse_op(s: &str) -> std::result::Result<TableOp, String> {
    let (name, operand) = s
        .split_once(':')
        .ok_or_else(|| format!("expected `<op>:<key>`, got '{s}'"))?;
    match name {
        "set" => {
            let (key, value) = operand
                .split_once('=')
                .ok_or_else(|| format!("expected `set:key=value`, got '{s}'"))?;
            Ok(TableOp::Set(parse_key(key), value.to_string()))
        }
        "get" => Ok(TableOp::Get(parse_key(operand))),
        "remove" => Ok(TableOp::Remove(parse_key(operand))),
        _ => Err(format!("unknown operation '{name}'")),
    }
}

/// The operations the CLI needs from either table.
trait KeyValueTable {
    fn put(&mut self, key: Key, value: String) -> Option<String>;
    fn lookup(&self, key: &Key) -> Result<Option<&String>>;
    fn delete(&mut self, key: &Key) -> Result<Option<String>>;
    fn summary(&self) -> String;
}

impl KeyValueTable for ChainedHashTable<Key, String> {
    fn put(&mut self, key: Key, value: String) -> Option<String> {
        self.set(key, value)
    }
    fn lookup(&self, key: &Key) -> Result<Option<&String>> {
        Ok(self.get(key))
    }
    fn delete(&mut self, key: &Key) -> Result<Option<String>> {
        Ok(self.remove(key))
    }
    fn summary(&self) -> String {
        format!(
            "len={} capacity={} load={:.2}",
            self.len(),
            self.capacity(),
            self.load()
        )
    }
}

impl KeyValueTable for ProbingHashTable<Key, String> {
    fn put(&mut self, key: Key, value: String) -> Option<String> {
        self.set(key, value)
    }
    fn lookup(&self, key: &Key) -> Result<Option<&String>> {
        self.get(key)
    }
    fn delete(&mut self, key: &Key) -> Result<Option<String>> {
        self.remove(key)
    }
    fn summary(&self) -> String {
        format!(
            "len={} capacity={} load={:.2} tombstones={}",
            self.len(),
            self.capacity(),
            self.load(),
            self.tombstones()
        )
    }
}

fn run_disjoint_set(
    elements: &[String],
    unions: &[(String, String)],
    finds: &[String],
) -> Result<Vec<String>> {
    let mut set: DisjointSet<String> = elements.iter().cloned().collect();
    for (a, b) in unions {
        set.union(a.as_str(), b.as_str())?;
    }
    let mut lines = Vec::new();
    for element in finds {
        let representative = set.find(element.as_str())?;
        lines.push(format!("find({element}) = {representative}"));
    }
    lines.push(format!("components: {}", set.component_count()));
    Ok(lines)
}

fn run_table(
    strategy: Strategy,
    capacity: Option<usize>,
    max_load: Option<f64>,
    ops: &[TableOp],
) -> Result<Vec<String>> {
    let mut table: Box<dyn KeyValueTable> = match strategy {
        Strategy::Chaining => {
            let defaults = ChainingConfig::default();
            Box::new(ChainedHashTable::with_config(ChainingConfig {
                capacity: capacity.unwrap_or(defaults.capacity),
                max_load: max_load.unwrap_or(defaults.max_load),
            })?)
        }
        Strategy::OpenAddressing => {
            let defaults = ProbingConfig::default();
            Box::new(ProbingHashTable::with_config(ProbingConfig {
                capacity: capacity.unwrap_or(defaults.capacity),
                max_load: max_load.unwrap_or(defaults.max_load),
                ..defaults
            })?)
        }
    };

    let mut lines = Vec::new();
    for op in ops {
        match op {
            TableOp::Set(key, value) => match table.put(key.clone(), value.clone()) {
                Some(old) => lines.push(format!("set {key} = {value} (was {old})")),
                None => lines.push(format!("set {key} = {value}")),
            },
            TableOp::Get(key) => match table.lookup(key)? {
                Some(value) => lines.push(format!("get {key} -> {value}")),
                None => lines.push(format!("get {key} -> (none)")),
            },
            TableOp::Remove(key) => match table.delete(key)? {
                Some(value) => lines.push(format!("remove {key} -> {value}")),
                None => lines.push(format!("remove {key} -> (none)")),
            },
        }
    }
    lines.push(table.summary());
    Ok(lines)
}

pub fn lib_main() {
    let args = Args::parse();
    let result = match &args.command {
        Command::DisjointSet {
            elements,
            unions,
            find,
        } => run_disjoint_set(elements, unions, find),
        Command::Table {
            strategy,
            capacity,
            max_load,
            ops,
        } => run_table(*strategy, *capacity, *max_load, ops),
    };
    match result {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
