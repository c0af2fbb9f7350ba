//! GraphQL execution over the in-memory backend.

use std::sync::Arc;

use async_graphql::dynamic::Schema;
use async_graphql::Request;
use axum::body::Body;
use axum::http::{self, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use biograph_api::{build_schema, router, AppState, SchemaOptions, DATABASE_HEADER};
use biograph_core::catalog::compile_biomedical;
use biograph_core::types::Attribute;
use biograph_core::{RequestContext, SchemaBuilder, ServiceConfig};
use biograph_graph::{InMemoryBackend, NodeRecord, Properties};

const DB: &str = "neo4j";

fn props(value: Value) -> Properties {
    value.as_object().cloned().unwrap()
}

fn schema_over(backend: Arc<InMemoryBackend>, mutations_enabled: bool) -> Schema {
    let options = SchemaOptions {
        mutations_enabled,
        ..SchemaOptions::default()
    };
    build_schema(Arc::new(compile_biomedical().unwrap()), backend, &options).unwrap()
}

async fn run(schema: &Schema, database: &str, query: &str) -> Value {
    let response = schema
        .execute(Request::new(query).data(RequestContext::for_database(database)))
        .await;
    assert!(response.errors.is_empty(), "errors: {:?}", response.errors);
    response.data.into_json().unwrap()
}

/// DB00001 targets P00734 twice (two assays) and P00748 once.
fn seed_targets(backend: &InMemoryBackend) -> (NodeRecord, NodeRecord, NodeRecord) {
    let drug = backend.insert_node(
        DB,
        "Drug",
        props(json!({"id": "DB00001", "name": "Lepirudin", "groups": ["approved"]})),
    );
    let thrombin = backend.insert_node(DB, "Protein", props(json!({"id": "P00734", "length": 622})));
    let f12 = backend.insert_node(DB, "Protein", props(json!({"id": "P00748", "length": 615})));

    backend.insert_edge(
        DB,
        "Drug_targets_protein",
        &drug,
        &thrombin,
        props(json!({"activity_type": "Ki", "pchembl": 9.1})),
    );
    backend.insert_edge(
        DB,
        "Drug_targets_protein",
        &drug,
        &thrombin,
        props(json!({"activity_type": "IC50", "pchembl": 8.4})),
    );
    backend.insert_edge(
        DB,
        "Drug_targets_protein",
        &drug,
        &f12,
        props(json!({"activity_type": "Kd", "pchembl": 5.0})),
    );
    (drug, thrombin, f12)
}

#[tokio::test]
async fn drug_targets_pair_each_protein_with_its_edge() {
    let backend = Arc::new(InMemoryBackend::new());
    seed_targets(&backend);
    let schema = schema_over(backend, false);

    let data = run(
        &schema,
        DB,
        r#"{
            drugs(where: {id: "DB00001"}) {
                id
                drugTargetsProteinConnection {
                    totalCount
                    edges { node { id } properties { activity_type pchembl } }
                }
            }
        }"#,
    )
    .await;

    let connection = &data["drugs"][0]["drugTargetsProteinConnection"];
    assert_eq!(connection["totalCount"], json!(3));
    let pairs: Vec<(String, String, f64)> = connection["edges"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| {
            (
                e["node"]["id"].as_str().unwrap().to_string(),
                e["properties"]["activity_type"].as_str().unwrap().to_string(),
                e["properties"]["pchembl"].as_f64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("P00734".to_string(), "Ki".to_string(), 9.1),
            ("P00734".to_string(), "IC50".to_string(), 8.4),
            ("P00748".to_string(), "Kd".to_string(), 5.0),
        ]
    );
}

#[tokio::test]
async fn reverse_view_sees_the_same_edges() {
    let backend = Arc::new(InMemoryBackend::new());
    seed_targets(&backend);
    let schema = schema_over(backend, false);

    let data = run(
        &schema,
        DB,
        r#"{
            proteins(where: {id: "P00734"}) {
                drugTargetsProteinReverse { id name }
                drugTargetsProteinReverseConnection {
                    edges { properties { activity_type } }
                }
            }
        }"#,
    )
    .await;

    let protein = &data["proteins"][0];
    assert_eq!(
        protein["drugTargetsProteinReverse"],
        json!([
            {"id": "DB00001", "name": "Lepirudin"},
            {"id": "DB00001", "name": "Lepirudin"}
        ])
    );
    assert_eq!(
        protein["drugTargetsProteinReverseConnection"]["edges"],
        json!([
            {"properties": {"activity_type": "Ki"}},
            {"properties": {"activity_type": "IC50"}}
        ])
    );
}

#[tokio::test]
async fn both_views_of_an_edge_share_its_property_set() {
    let backend = Arc::new(InMemoryBackend::new());
    let protein = backend.insert_node(DB, "Protein", props(json!({"id": "P04637"})));
    let domain = backend.insert_node(DB, "ProteinDomain", props(json!({"id": "IPR002117"})));
    backend.insert_edge(
        DB,
        "Protein_has_domain",
        &protein,
        &domain,
        props(json!({"id": "e1", "locations": ["102-292"]})),
    );
    let schema = schema_over(backend, false);

    let sdl = schema.sdl();
    assert!(sdl.contains("type ProteinProteinHasDomainRelationship"));
    assert!(sdl.contains("type ProteinDomainProteinHasDomainReverseRelationship"));
    assert_eq!(sdl.matches("properties: Protein_has_domain").count(), 2);

    let data = run(
        &schema,
        DB,
        r#"{
            proteins { proteinHasDomainConnection { edges { node { id } properties { id locations } } } }
            proteinDomains { proteinHasDomainReverseConnection { edges { node { id } properties { id locations } } } }
        }"#,
    )
    .await;

    let out = &data["proteins"][0]["proteinHasDomainConnection"]["edges"][0];
    let back = &data["proteinDomains"][0]["proteinHasDomainReverseConnection"]["edges"][0];
    assert_eq!(out["node"]["id"], json!("IPR002117"));
    assert_eq!(back["node"]["id"], json!("P04637"));
    assert_eq!(out["properties"], back["properties"]);
    assert_eq!(out["properties"]["locations"], json!(["102-292"]));
}

#[tokio::test]
async fn concurrent_requests_keep_their_own_database() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.insert_node("human", "Gene", props(json!({"id": "ENSG00000141510"})));
    backend.insert_node("mouse", "Gene", props(json!({"id": "ENSMUSG00000059552"})));
    backend.insert_node("mouse", "Gene", props(json!({"id": "ENSMUSG00000020122"})));
    let schema = schema_over(backend, false);

    let query = "{ genes { id } genesCount }";
    let (human, mouse, empty) = tokio::join!(
        run(&schema, "human", query),
        run(&schema, "mouse", query),
        run(&schema, "unused", query),
    );

    assert_eq!(human["genes"], json!([{"id": "ENSG00000141510"}]));
    assert_eq!(mouse["genesCount"], json!(2));
    assert_eq!(empty["genes"], json!([]));
    assert_eq!(empty["genesCount"], json!(0));
}

#[tokio::test]
async fn scalar_only_kind_is_queryable() {
    let mut builder = SchemaBuilder::new();
    builder.declare_node_kind(
        "GOTerm",
        vec![Attribute::id(), Attribute::string("name"), Attribute::string("namespace")],
    );
    let compiled = Arc::new(builder.compile().unwrap());
    assert!(compiled.relationships("GOTerm").is_empty());

    let backend = Arc::new(InMemoryBackend::new());
    backend.insert_node(
        DB,
        "GOTerm",
        props(json!({"id": "GO:0008150", "name": "biological_process"})),
    );
    let schema = build_schema(compiled, backend, &SchemaOptions::default()).unwrap();

    let data = run(&schema, DB, "{ goTerms { id name namespace } goTermsCount }").await;
    assert_eq!(
        data["goTerms"],
        json!([{"id": "GO:0008150", "name": "biological_process", "namespace": null}])
    );
    assert_eq!(data["goTermsCount"], json!(1));
}

#[tokio::test]
async fn filters_and_paging() {
    let backend = Arc::new(InMemoryBackend::new());
    for (id, name, synonyms) in [
        ("DOID:2841", "asthma", vec!["bronchial asthma"]),
        ("DOID:9351", "diabetes mellitus", vec!["DM"]),
        ("DOID:1612", "breast cancer", vec!["breast carcinoma"]),
    ] {
        backend.insert_node(
            DB,
            "Disease",
            props(json!({"id": id, "name": name, "synonyms": synonyms})),
        );
    }
    let schema = schema_over(backend, false);

    let data = run(
        &schema,
        DB,
        r#"{
            byIn: diseases(where: {id_IN: ["DOID:2841", "DOID:1612"]}) { id }
            byContains: diseases(where: {name_CONTAINS: "cancer"}) { id }
            bySynonym: diseases(where: {synonyms_INCLUDES: "DM"}) { name }
            paged: diseases(options: {offset: 1, limit: 1}) { id }
            none: diseasesCount(where: {id: "DOID:0"})
        }"#,
    )
    .await;

    assert_eq!(data["byIn"], json!([{"id": "DOID:2841"}, {"id": "DOID:1612"}]));
    assert_eq!(data["byContains"], json!([{"id": "DOID:1612"}]));
    assert_eq!(data["bySynonym"], json!([{"name": "diabetes mellitus"}]));
    assert_eq!(data["paged"], json!([{"id": "DOID:9351"}]));
    assert_eq!(data["none"], json!(0));
}

#[tokio::test]
async fn embeddings_are_returned_but_not_filterable() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.insert_node(
        DB,
        "Protein",
        props(json!({"id": "P69905", "esm2_embedding": [0.25, -0.5, 1.0]})),
    );
    let schema = schema_over(backend, false);

    let data = run(&schema, DB, "{ proteins { esm2_embedding prott5_embedding } }").await;
    assert_eq!(
        data["proteins"][0],
        json!({"esm2_embedding": [0.25, -0.5, 1.0], "prott5_embedding": null})
    );

    let response = schema
        .execute(r#"{ proteins(where: {esm2_embedding: [0.25]}) { id } }"#)
        .await;
    assert!(!response.errors.is_empty());
}

#[tokio::test]
async fn disabled_mutations_reject_writes() {
    let schema = schema_over(Arc::new(InMemoryBackend::new()), false);
    let response = schema
        .execute(r#"mutation { createGenes(input: [{id: "ENSG1"}]) { id } }"#)
        .await;
    assert!(!response.errors.is_empty());
}

#[tokio::test]
async fn default_schema_creates_updates_and_deletes() {
    let backend = Arc::new(InMemoryBackend::new());
    let schema = build_schema(
        Arc::new(compile_biomedical().unwrap()),
        backend.clone(),
        &SchemaOptions::default(),
    )
    .unwrap();

    let created = run(
        &schema,
        DB,
        r#"mutation {
            createGenes(input: [{id: "ENSG00000141510", kegg: ["hsa:7157"]}, {id: "ENSG00000012048"}]) { id kegg }
        }"#,
    )
    .await;
    assert_eq!(
        created["createGenes"],
        json!([
            {"id": "ENSG00000141510", "kegg": ["hsa:7157"]},
            {"id": "ENSG00000012048", "kegg": null}
        ])
    );
    assert_eq!(backend.node_count(DB), 2);

    let updated = run(
        &schema,
        DB,
        r#"mutation {
            updateGenes(where: {id: "ENSG00000141510"}, update: {genes: ["TP53"], kegg: null}) { id genes kegg }
        }"#,
    )
    .await;
    assert_eq!(
        updated["updateGenes"],
        json!([{"id": "ENSG00000141510", "genes": ["TP53"], "kegg": null}])
    );

    let deleted = run(
        &schema,
        DB,
        r#"mutation { deleteGenes(where: {id: "ENSG00000012048"}) { nodesDeleted } }"#,
    )
    .await;
    assert_eq!(deleted["deleteGenes"]["nodesDeleted"], json!(1));
    assert_eq!(backend.node_count(DB), 1);
}

#[tokio::test]
async fn http_router_executes_and_honours_database_header() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.insert_node("biocypher", "Pathway", props(json!({"id": "R-HSA-109581", "name": "Apoptosis"})));

    let mut config = ServiceConfig::default();
    config.api.allow_database_override = true;
    let schema = build_schema(
        Arc::new(compile_biomedical().unwrap()),
        backend,
        &SchemaOptions::from(&config),
    )
    .unwrap();
    let app = router(AppState::new(schema, &config));

    let request = http::Request::builder()
        .method("POST")
        .uri("/graphql")
        .header("content-type", "application/json")
        .header(DATABASE_HEADER, "biocypher")
        .body(Body::from(json!({"query": "{ pathways { name } }"}).to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["data"]["pathways"], json!([{"name": "Apoptosis"}]));

    let health = app
        .oneshot(http::Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
}
