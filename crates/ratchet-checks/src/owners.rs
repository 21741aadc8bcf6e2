//! Object-ownership check.
//!
//! Creates the full object-graph shape under several roles before, between
//! and after upgrade boundaries, then asserts which role the catalog reports
//! as owner of each object. Ownership tracking was introduced at 0.48.0-dev:
//! objects created under an earlier base version are owned by the system
//! default-owner sentinel instead of their creating role, so the expected
//! listings branch on the base version.

use std::fmt;

use serde::{Deserialize, Serialize};

use ratchet_core::{Block, Check, CheckContext, Script, Version, VersionGate};

use crate::objects::{create_objects, drop_objects};

/// Sentinel reported for objects created before ownership tracking existed.
pub const DEFAULT_OWNER: &str = "default_owner";

const ROLE_01: &str = "owner_role_01";
const ROLE_02: &str = "owner_role_02";
const ROLE_03: &str = "owner_role_03";

/// Identity the catalog reports as an object's owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Owner {
    /// The system default-owner placeholder.
    Default,

    /// A concrete role.
    Role(String),
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Default => write!(f, "{DEFAULT_OWNER}"),
            Owner::Role(name) => write!(f, "{name}"),
        }
    }
}

fn dev(major: u64, minor: u64, patch: u64) -> Version {
    Version {
        major,
        minor,
        patch,
        prerelease: Some("dev".to_string()),
    }
}

/// Owner the catalog reports for objects created during `initialize` and
/// the first `manipulate` step, by base version.
fn pre_boundary_owner_gate() -> VersionGate<Owner> {
    VersionGate::new(Owner::Default).with(dev(0, 48, 0), Owner::Role(ROLE_01.to_string()))
}

/// The object-ownership check.
#[derive(Debug, Default)]
pub struct Owners;

impl Check for Owners {
    fn name(&self) -> &str {
        "owners"
    }

    fn can_run(&self, base_version: &Version) -> bool {
        // Role-attributed object creation first shipped in 0.47.0.
        *base_version >= dev(0, 47, 0)
    }

    fn initialize(&self, _ctx: &CheckContext) -> Script {
        Script::new(vec![Block::statement(format!("CREATE ROLE {ROLE_01}"))])
            + create_objects(ROLE_01, 1, true)
    }

    fn manipulate(&self, _ctx: &CheckContext) -> Vec<Script> {
        vec![
            create_objects(ROLE_01, 2, false)
                + Script::new(vec![Block::statement(format!("CREATE ROLE {ROLE_02}"))]),
            create_objects(ROLE_01, 3, false)
                + create_objects(ROLE_02, 4, false)
                + Script::new(vec![Block::statement(format!("CREATE ROLE {ROLE_03}"))]),
        ]
    }

    fn validate(&self, ctx: &CheckContext) -> Script {
        // Discriminators 1 and 2 were created before the 0.48.0 boundary on
        // pre-0.48.0 base versions, so their reported owner is version-gated.
        // Objects 3..=7 are always explicitly role-owned. All owner names in
        // the listings are 13 characters wide, so the tables stay aligned
        // for either variant.
        let owner1 = pre_boundary_owner_gate()
            .select(&ctx.base_version)
            .to_string();
        let owners = [
            owner1.as_str(),
            owner1.as_str(),
            ROLE_01,
            ROLE_02,
            ROLE_01,
            ROLE_02,
            ROLE_03,
        ];

        // TODO: also verify database, schema and type owners through the
        // system catalog tables once the catalog reports them (tracked
        // upstream); the meta-command listings below are the only coverage
        // for those three kinds today.
        create_objects(ROLE_01, 5, false)
            + create_objects(ROLE_02, 6, false)
            + create_objects(ROLE_03, 7, false)
            + Script::new(vec![
                Block::assertion("\\l owner_db*", database_listing(&owners)),
                Block::assertion("\\dn owner_schema*", schema_listing(&owners)),
                Block::assertion("\\dt owner_t*", relation_listing(&owners, "owner_t", "table")),
                Block::assertion("\\di owner_i*", index_listing(&owners)),
                Block::assertion("\\dv owner_v*", relation_listing(&owners, "owner_v", "view")),
                Block::assertion(
                    "\\dmv owner_mv*",
                    relation_listing(&owners, "owner_mv", "materialized view"),
                ),
                Block::assertion(
                    catalog_owner_query("sys_types", "owner_type"),
                    catalog_owner_rows(&owners, "owner_type"),
                ),
                Block::assertion(
                    catalog_owner_query("sys_secrets", "owner_secret"),
                    catalog_owner_rows(&owners, "owner_secret"),
                ),
                Block::assertion(
                    "SELECT sys_sources.name, sys_roles.name FROM sys_sources \
                     JOIN sys_roles ON sys_sources.owner_id = sys_roles.id \
                     WHERE sys_sources.name LIKE 'owner_source%' AND type = 'load-generator'",
                    format!("owner_source1 {owner1}"),
                ),
                Block::assertion(
                    catalog_owner_query("sys_sinks", "owner_sink"),
                    format!("owner_sink1 {owner1}"),
                ),
                Block::assertion(
                    catalog_owner_query("sys_clusters", "owner_cluster"),
                    format!("owner_cluster1 {owner1}"),
                ),
                Block::assertion(
                    catalog_owner_query("sys_cluster_replicas", "owner_cluster_r"),
                    format!("owner_cluster_r1 {owner1}"),
                ),
            ])
            + drop_objects(5)
            + drop_objects(6)
            + drop_objects(7)
    }
}

fn database_listing(owners: &[&str; 7]) -> String {
    let mut out = String::from(
        "                             List of databases\n   \
         Name    |     Owner     | Encoding | Collate | Ctype | Access privileges\n\
         -----------+---------------+----------+---------+-------+-------------------",
    );
    for (index, owner) in owners.iter().enumerate() {
        out.push_str(&format!(
            "\n owner_db{} | {} | UTF8     | C       | C     |",
            index + 1,
            owner
        ));
    }
    out
}

fn schema_listing(owners: &[&str; 7]) -> String {
    let mut out = String::from(
        "        List of schemas\n     \
         Name      |     Owner\n\
         ---------------+---------------",
    );
    for (index, owner) in owners.iter().enumerate() {
        out.push_str(&format!("\n owner_schema{} | {}", index + 1, owner));
    }
    out
}

fn relation_listing(owners: &[&str; 7], prefix: &str, kind: &str) -> String {
    let name_width = format!("{prefix}1").len().max("Name".len()) + 2;
    let kind_width = kind.len().max("Type".len()) + 2;
    // schema col (8) + owner col (15) + three column separators
    let table_width = name_width + kind_width + 26;
    let title = format!("{:^table_width$}", "List of relations");
    let mut out = format!(
        "{title}\n Schema |{name:^name_width$}|{kind_header:^kind_width$}|     Owner\n\
         --------+{name_rule}+{kind_rule}+---------------",
        title = title.trim_end(),
        name = "Name",
        kind_header = "Type",
        name_rule = "-".repeat(name_width),
        kind_rule = "-".repeat(kind_width),
    );
    for (index, owner) in owners.iter().enumerate() {
        out.push_str(&format!(
            "\n public |{:^name_width$}| {kind} | {owner}",
            format!("{prefix}{}", index + 1),
        ));
    }
    out
}

fn index_listing(owners: &[&str; 7]) -> String {
    let mut out = String::from(
        "                  List of relations\n \
         Schema |   Name   | Type  |     Owner     |  Table\n\
         --------+----------+-------+---------------+----------",
    );
    for (index, owner) in owners.iter().enumerate() {
        out.push_str(&format!(
            "\n public | owner_i{n} | index | {owner} | owner_t{n}",
            n = index + 1,
        ));
    }
    out
}

fn catalog_owner_query(catalog_table: &str, name_prefix: &str) -> String {
    format!(
        "SELECT {catalog_table}.name, sys_roles.name FROM {catalog_table} \
         JOIN sys_roles ON {catalog_table}.owner_id = sys_roles.id \
         WHERE {catalog_table}.name LIKE '{name_prefix}%'"
    )
}

fn catalog_owner_rows(owners: &[&str; 7], name_prefix: &str) -> String {
    owners
        .iter()
        .enumerate()
        .map(|(index, owner)| format!("{name_prefix}{} {owner}", index + 1))
        .collect::<Vec<_>>()
        .join("\n")
}
