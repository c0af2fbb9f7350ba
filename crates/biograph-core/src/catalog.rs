//! The canonical biomedical knowledge-graph schema.
//!
//! Edge kinds are named `Source_verb_target`; the same name is used for the
//! edge's property set and yields the client field names
//! (`drugTargetsProtein` / `drugTargetsProteinReverse`). The stored
//! relationship type is kept as the database holds it (`Targets`, `Is_a`,
//! ...), so several edge kinds may share one stored type.

use crate::error::SchemaError;
use crate::schema::{CompiledSchema, SchemaBuilder};
use crate::types::{Attribute, EdgeDeclaration, ScalarType};

/// Build the biomedical schema declarations.
pub fn biomedical() -> SchemaBuilder {
    let mut b = SchemaBuilder::new();
    declare_node_kinds(&mut b);
    declare_ontology_edges(&mut b);
    declare_disease_edges(&mut b);
    declare_gene_edges(&mut b);
    declare_protein_edges(&mut b);
    declare_drug_edges(&mut b);
    b
}

/// Compile the biomedical schema.
pub fn compile_biomedical() -> Result<CompiledSchema, SchemaError> {
    biomedical().compile()
}

// ── Node Kinds ────────────────────────────────────────────────────

fn named(extra: Vec<Attribute>) -> Vec<Attribute> {
    let mut attrs = vec![Attribute::id(), Attribute::string("name")];
    attrs.extend(extra);
    attrs
}

fn declare_node_kinds(b: &mut SchemaBuilder) {
    let go_term = || named(vec![Attribute::embedding("anc2vec_embedding")]);
    b.declare_node_kind("BiologicalProcess", go_term())
        .declare_node_kind("CellularComponent", go_term())
        .declare_node_kind("MolecularFunction", go_term());

    b.declare_node_kind(
        "Disease",
        named(vec![
            Attribute::string("doid"),
            Attribute::string("efo"),
            Attribute::string("hp"),
            Attribute::string("icd10cm"),
            Attribute::string("icd9"),
            Attribute::string("meddra"),
            Attribute::string("mesh"),
            Attribute::string("ncit"),
            Attribute::string("omim"),
            Attribute::string("orphanet"),
            Attribute::strings("synonyms"),
            Attribute::string("umls"),
            Attribute::embedding("doc2vec_embedding"),
        ]),
    );

    b.declare_node_kind(
        "EcNumber",
        named(vec![Attribute::embedding("rxnfp_embedding")]),
    );

    b.declare_node_kind(
        "Gene",
        vec![
            Attribute::id(),
            Attribute::strings("ensembl"),
            Attribute::strings("ensembl_gene_ids"),
            Attribute::strings("genes"),
            Attribute::strings("kegg"),
            Attribute::embedding("nt_embedding"),
        ],
    );

    b.declare_node_kind_with_labels(
        "Compound",
        &["MolecularMixture"],
        vec![
            Attribute::id(),
            Attribute::float("alogp"),
            Attribute::float("full_mwt"),
            Attribute::int("heavy_atoms"),
            Attribute::string("inchi"),
            Attribute::string("inchikey"),
            Attribute::float("qed_score"),
            Attribute::string("species"),
            Attribute::string("type"),
            Attribute::embedding("selformer_embedding"),
        ],
    );

    b.declare_node_kind(
        "OrganismTaxon",
        vec![Attribute::id(), Attribute::string("organism")],
    );

    b.declare_node_kind(
        "Pathway",
        named(vec![
            Attribute::string("organism"),
            Attribute::embedding("biokeen_embedding"),
        ]),
    );

    b.declare_node_kind(
        "Phenotype",
        named(vec![
            Attribute::strings("synonyms"),
            Attribute::embedding("cada_embedding"),
        ]),
    );

    b.declare_node_kind(
        "Protein",
        vec![
            Attribute::id(),
            Attribute::strings("ec"),
            Attribute::int("length"),
            Attribute::int("mass"),
            Attribute::int("organism_id"),
            Attribute::strings("protein_names"),
            Attribute::strings("proteome"),
            Attribute::strings("secondary_ids"),
            Attribute::list("virus_hosts", ScalarType::Int),
            Attribute::embedding("esm2_embedding"),
            Attribute::embedding("prott5_embedding"),
        ],
    );

    b.declare_node_kind(
        "ProteinDomain",
        named(vec![
            Attribute::strings("child_list"),
            Attribute::strings("ec"),
            Attribute::strings("parent_list"),
            Attribute::strings("pdb"),
            Attribute::strings("pfam"),
            Attribute::int("protein_count"),
            Attribute::string("type"),
            Attribute::embedding("dom2vec_embedding"),
        ]),
    );

    b.declare_node_kind("SideEffect", named(vec![Attribute::strings("synonyms")]));

    b.declare_node_kind_with_labels(
        "Drug",
        &["SmallMolecule"],
        named(vec![
            Attribute::strings("atc_codes"),
            Attribute::string("bindingdb"),
            Attribute::string("cas_number"),
            Attribute::string("chebi"),
            Attribute::string("chembl"),
            Attribute::string("clinicaltrials"),
            Attribute::string("drugbank_id"),
            Attribute::string("drugcentral"),
            Attribute::strings("general_references"),
            Attribute::strings("groups"),
            Attribute::string("inchi"),
            Attribute::string("inchikey"),
            Attribute::string("kegg_drug"),
            Attribute::string("pdb"),
            Attribute::string("pharmgkb"),
            Attribute::string("pubchem"),
            Attribute::string("rxcui"),
            Attribute::string("zinc"),
            Attribute::embedding("selformer_embedding"),
        ]),
    );
}

// ── Edge Kinds ────────────────────────────────────────────────────

/// Evidence-free edges carry only an advisory identifier.
fn id_only() -> Vec<Attribute> {
    vec![Attribute::id()]
}

/// GO annotation evidence.
fn go_evidence() -> Vec<Attribute> {
    vec![
        Attribute::id(),
        Attribute::string("evidence_code"),
        Attribute::string("reference"),
    ]
}

fn edge(name: &str, source: &str, target: &str, stored: &str) -> EdgeDeclaration {
    EdgeDeclaration::new(name, source, target).stored_as(stored)
}

/// Hierarchy and regulation edges between ontology terms and between
/// pathways, phenotypes, EC numbers, and side effects.
fn declare_ontology_edges(b: &mut SchemaBuilder) {
    const BP: &str = "BiologicalProcess";
    const CC: &str = "CellularComponent";
    const MF: &str = "MolecularFunction";

    let taxonomy = [
        ("Biological_process_is_a_biological_process", BP, BP, "Is_a"),
        ("Biological_process_negatively_regulates_biological_process", BP, BP, "Negatively_regulates"),
        ("Biological_process_negatively_regulates_molecular_function", BP, MF, "Negatively_regulates"),
        ("Biological_process_part_of_biological_process", BP, BP, "Part_of"),
        ("Biological_process_positively_regulates_biological_process", BP, BP, "Positively_regulates"),
        ("Biological_process_positively_regulates_molecular_function", BP, MF, "Positively_regulates"),
        ("Cellular_component_is_a_cellular_component", CC, CC, "Is_a"),
        ("Cellular_component_part_of_cellular_component", CC, CC, "Part_of"),
        ("Molecular_function_is_a_molecular_function", MF, MF, "Is_a"),
        ("Molecular_function_negatively_regulates_molecular_function", MF, MF, "Negatively_regulates"),
        ("Molecular_function_part_of_molecular_function", MF, MF, "Part_of"),
        ("Molecular_function_positively_regulates_molecular_function", MF, MF, "Positively_regulates"),
        ("Ec_number_is_a_ec_number", "EcNumber", "EcNumber", "Ec_number_is_a_ec_number"),
        ("Pathway_is_equivalent_to_pathway", "Pathway", "Pathway", "Pathway_is_equivalent_to_pathway"),
        ("Pathway_is_part_of_pathway", "Pathway", "Pathway", "Pathway_is_part_of_pathway"),
        ("Pathway_participates_pathway", "Pathway", "Pathway", "Pathway_participates_pathway"),
        ("Phenotype_is_a_phenotype", "Phenotype", "Phenotype", "Phenotype_is_a_phenotype"),
        ("Side_effect_is_a_side_effect", "SideEffect", "SideEffect", "Side_effect_is_a_side_effect"),
    ];
    for (name, source, target, stored) in taxonomy {
        b.declare_edge_with_properties(edge(name, source, target, stored), id_only());
    }
}

fn declare_disease_edges(b: &mut SchemaBuilder) {
    b.declare_edge_with_properties(
        EdgeDeclaration::new("Disease_is_a_disease", "Disease", "Disease"),
        id_only(),
    )
    .declare_edge_with_properties(
        EdgeDeclaration::new("Disease_is_associated_with_disease", "Disease", "Disease"),
        vec![
            Attribute::id(),
            Attribute::float("disgenet_jaccard_genes_score"),
            Attribute::float("disgenet_jaccard_variants_score"),
            Attribute::strings("source"),
        ],
    )
    .declare_edge_with_properties(
        EdgeDeclaration::new("Disease_is_comorbid_with_disease", "Disease", "Disease"),
        id_only(),
    )
    .declare_edge_with_properties(
        EdgeDeclaration::new("Disease_is_treated_by_drug", "Disease", "Drug"),
        vec![
            Attribute::id(),
            Attribute::string("max_phase"),
            Attribute::strings("pubmed_ids"),
            Attribute::strings("source"),
        ],
    )
    .declare_edge_with_properties(
        EdgeDeclaration::new("Disease_modulates_pathway", "Disease", "Pathway"),
        vec![Attribute::id(), Attribute::strings("source")],
    )
    .declare_edge_with_properties(
        EdgeDeclaration::new("Phenotype_is_associated_with_disease", "Phenotype", "Disease"),
        vec![
            Attribute::id(),
            Attribute::string("evidence"),
            Attribute::strings("pubmed_ids"),
        ],
    );
}

fn declare_gene_edges(b: &mut SchemaBuilder) {
    b.declare_edge_with_properties(
        edge("Gene_encodes_protein", "Gene", "Protein", "Encodes"),
        id_only(),
    )
    .declare_edge_with_properties(
        edge("Gene_is_orthologous_with_gene", "Gene", "Gene", "Is_Orthologous_With"),
        vec![
            Attribute::id(),
            Attribute::float("oma_orthology_score"),
            Attribute::string("relation_type"),
            Attribute::strings("source"),
        ],
    )
    .declare_edge_with_properties(
        EdgeDeclaration::new("Gene_is_related_to_disease", "Gene", "Disease"),
        vec![
            Attribute::id(),
            Attribute::string("allele_id"),
            Attribute::string("clinical_significance"),
            Attribute::strings("dbsnp_id"),
            Attribute::float("diseases_confidence_score"),
            Attribute::float("disgenet_gene_disease_score"),
            Attribute::float("disgenet_variant_disease_score"),
            Attribute::float("opentargets_score"),
            Attribute::strings("pubmed_ids"),
            Attribute::int("review_status"),
            Attribute::strings("source"),
            Attribute::strings("variant_source"),
            Attribute::string("variation_id"),
        ],
    )
    .declare_edge_with_properties(
        EdgeDeclaration::new("Gene_regulates_gene", "Gene", "Gene"),
        vec![
            Attribute::id(),
            Attribute::strings("pubmed_id"),
            Attribute::strings("source"),
            Attribute::string("tf_effect"),
        ],
    );
}

fn declare_protein_edges(b: &mut SchemaBuilder) {
    b.declare_edge_with_properties(
        edge("Protein_belongs_to_organism_taxon", "Protein", "OrganismTaxon", "Belongs_To"),
        id_only(),
    )
    .declare_edge_with_properties(
        EdgeDeclaration::new("Protein_catalyzes_ec_number", "Protein", "EcNumber"),
        id_only(),
    )
    .declare_edge_with_properties(
        edge(
            "Protein_contributes_to_molecular_function",
            "Protein",
            "MolecularFunction",
            "Contributes_to",
        ),
        go_evidence(),
    )
    .declare_edge_with_properties(
        edge(
            "Protein_enables_molecular_function",
            "Protein",
            "MolecularFunction",
            "Enables",
        ),
        go_evidence(),
    )
    .declare_edge_with_properties(
        edge("Protein_has_domain", "Protein", "ProteinDomain", "Has"),
        vec![Attribute::id(), Attribute::strings("locations")],
    )
    .declare_edge_with_properties(
        edge("Protein_interacts_with_protein", "Protein", "Protein", "Interacts_With"),
        vec![
            Attribute::id(),
            Attribute::float("intact_score"),
            Attribute::string("interaction_type"),
            Attribute::string("method"),
            Attribute::strings("pubmed_id"),
            Attribute::strings("source"),
            Attribute::int("string_combined_score"),
            Attribute::int("string_physical_combined_score"),
        ],
    )
    .declare_edge_with_properties(
        edge(
            "Protein_involved_in_biological_process",
            "Protein",
            "BiologicalProcess",
            "Involved_in",
        ),
        go_evidence(),
    )
    .declare_edge_with_properties(
        edge(
            "Protein_is_active_in_cellular_component",
            "Protein",
            "CellularComponent",
            "Is_active_in",
        ),
        go_evidence(),
    )
    .declare_edge_with_properties(
        EdgeDeclaration::new("Protein_is_associated_with_phenotype", "Protein", "Phenotype"),
        id_only(),
    )
    .declare_edge_with_properties(
        edge(
            "Protein_located_in_cellular_component",
            "Protein",
            "CellularComponent",
            "Located_in",
        ),
        go_evidence(),
    )
    .declare_edge_with_properties(
        edge(
            "Protein_part_of_cellular_component",
            "Protein",
            "CellularComponent",
            "Part_of",
        ),
        id_only(),
    )
    .declare_edge_with_properties(
        EdgeDeclaration::new("Protein_take_part_in_pathway", "Protein", "Pathway"),
        vec![Attribute::id(), Attribute::string("source")],
    )
    .declare_edge_with_properties(
        edge(
            "Protein_domain_enables_molecular_function",
            "ProteinDomain",
            "MolecularFunction",
            "Enables",
        ),
        id_only(),
    )
    .declare_edge_with_properties(
        edge(
            "Protein_domain_involved_in_biological_process",
            "ProteinDomain",
            "BiologicalProcess",
            "Involved_in",
        ),
        id_only(),
    )
    .declare_edge_with_properties(
        edge(
            "Protein_domain_located_in_cellular_component",
            "ProteinDomain",
            "CellularComponent",
            "Located_in",
        ),
        id_only(),
    );
}

fn declare_drug_edges(b: &mut SchemaBuilder) {
    b.declare_edge_with_properties(
        edge("Compound_targets_protein", "Compound", "Protein", "Targets"),
        vec![
            Attribute::id(),
            Attribute::string("activity_type"),
            Attribute::float("activity_value"),
            Attribute::strings("assay_chembl"),
            Attribute::float("confidence_score"),
            Attribute::float("pchembl"),
            Attribute::strings("source"),
            Attribute::float("stitch_combined_score"),
        ],
    )
    .declare_edge_with_properties(
        edge(
            "Drug_decreases_expression_gene",
            "Drug",
            "Gene",
            "Decreases_expression",
        ),
        vec![Attribute::id(), Attribute::strings("references")],
    )
    .declare_edge_with_properties(
        EdgeDeclaration::new("Drug_has_side_effect", "Drug", "SideEffect"),
        vec![
            Attribute::id(),
            Attribute::float("proportional_reporting_ratio"),
            Attribute::strings("source"),
        ],
    )
    .declare_edge_with_properties(
        EdgeDeclaration::new("Drug_has_target_in_pathway", "Drug", "Pathway"),
        vec![Attribute::id(), Attribute::string("source")],
    )
    .declare_edge_with_properties(
        edge(
            "Drug_increases_expression_gene",
            "Drug",
            "Gene",
            "Increases_expression",
        ),
        vec![Attribute::id(), Attribute::strings("references")],
    )
    .declare_edge_with_properties(
        edge("Drug_interacts_with_drug", "Drug", "Drug", "Interacts_with"),
        vec![
            Attribute::id(),
            Attribute::string("interaction_level"),
            Attribute::strings("interaction_type"),
            Attribute::string("recommendation"),
            Attribute::strings("source"),
        ],
    )
    .declare_edge_with_properties(
        edge("Drug_targets_protein", "Drug", "Protein", "Targets"),
        vec![
            Attribute::id(),
            Attribute::string("activity_type"),
            Attribute::float("activity_value"),
            Attribute::float("confidence_score"),
            Attribute::float("dgidb_score"),
            Attribute::boolean("direct_interaction"),
            Attribute::boolean("disease_efficacy"),
            Attribute::string("known_action"),
            Attribute::string("mechanism_of_action"),
            Attribute::string("mechanism_of_action_type"),
            Attribute::float("pchembl"),
            Attribute::strings("references"),
            Attribute::strings("source"),
            Attribute::float("stitch_combined_score"),
        ],
    );
}
