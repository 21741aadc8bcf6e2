//! Reusable object creation/teardown templates.
//!
//! Checks that exercise catalog state repeat a fixed object-graph shape
//! under many discriminators. Both templates are pure functions returning
//! immutable script fragments, so fragments compose freely and never share
//! builder state. The discriminator keeps names globally unique across
//! repeated invocations, which is what makes concurrent sibling checks safe
//! to run against the same catalog.

use ratchet_core::{Block, Script};

/// One mutation block creating one of each supported object kind under
/// `discriminator`, executed as `role`.
///
/// `expensive` additionally creates a load-generator source, a kafka sink
/// and a one-replica compute cluster. Those cost real compute on the system
/// under test, so callers invoke the expensive form at most once per check
/// run.
pub fn create_objects(role: &str, discriminator: u32, expensive: bool) -> Script {
    let i = discriminator;
    let mut statements = vec![
        format!("CREATE DATABASE owner_db{i}"),
        format!("CREATE SCHEMA owner_schema{i}"),
        format!("CREATE CONNECTION owner_kafka_conn{i} FOR KAFKA BROKER '${{harness.kafka-addr}}'"),
        format!(
            "CREATE CONNECTION owner_csr_conn{i} FOR CONFLUENT SCHEMA REGISTRY URL '${{harness.schema-registry-url}}'"
        ),
        format!("CREATE TYPE owner_type{i} AS LIST (ELEMENT TYPE = text)"),
        format!("CREATE TABLE owner_t{i} (c1 int, c2 owner_type{i})"),
        format!("CREATE INDEX owner_i{i} ON owner_t{i} (c2)"),
        format!("CREATE VIEW owner_v{i} AS SELECT * FROM owner_t{i}"),
        format!("CREATE MATERIALIZED VIEW owner_mv{i} AS SELECT * FROM owner_t{i}"),
        format!("CREATE SECRET owner_secret{i} AS 'MY_SECRET'"),
    ];

    if expensive {
        statements.push(format!(
            "CREATE SOURCE owner_source{i} FROM LOAD GENERATOR COUNTER (SCALE FACTOR 0.01)"
        ));
        statements.push(format!(
            "CREATE SINK owner_sink{i} FROM owner_mv{i} INTO KAFKA CONNECTION owner_kafka_conn{i} \
             (TOPIC 'sink-owner{i}') FORMAT AVRO USING CONFLUENT SCHEMA REGISTRY CONNECTION \
             owner_csr_conn{i} ENVELOPE DEBEZIUM"
        ));
        statements.push(format!(
            "CREATE CLUSTER owner_cluster{i} REPLICAS (owner_cluster_r{i} (SIZE '4'))"
        ));
    }

    Script::new(vec![Block::mutation_as(role, statements)])
}

/// Drop statements for the non-expensive object set created under
/// `discriminator`.
///
/// Order is strict reverse-dependency order: secret, materialized view,
/// view, index, table, type, connections, schema, database. Dropping a
/// schema or database before its contained objects is rejected by the
/// system under test, so any reordering here turns into a false negative.
pub fn drop_objects(discriminator: u32) -> Script {
    let i = discriminator;
    Script::new(vec![
        Block::statement(format!("DROP SECRET owner_secret{i}")),
        Block::statement(format!("DROP MATERIALIZED VIEW owner_mv{i}")),
        Block::statement(format!("DROP VIEW owner_v{i}")),
        Block::statement(format!("DROP INDEX owner_i{i}")),
        Block::statement(format!("DROP TABLE owner_t{i}")),
        Block::statement(format!("DROP TYPE owner_type{i}")),
        Block::statement(format!("DROP CONNECTION owner_csr_conn{i}")),
        Block::statement(format!("DROP CONNECTION owner_kafka_conn{i}")),
        Block::statement(format!("DROP SCHEMA owner_schema{i}")),
        Block::statement(format!("DROP DATABASE owner_db{i}")),
    ])
}
