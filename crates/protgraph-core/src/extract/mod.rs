//! Entity extraction from an entry's attribute tree.
//!
//! Protein, FullName and Organism are required: a missing field aborts the
//! whole entry. Features, genes and references are extracted one by one and a
//! malformed one is recorded in `ProteinEntry::rejected` while its siblings
//! carry on.

pub mod model;

use tracing::debug;

use crate::error::SchemaError;
use crate::record::{Field, Record};
use model::{Author, Feature, FullName, Gene, Organism, Protein, ProteinEntry, Reference};

const TAXONOMY_DB: &str = "NCBI Taxonomy";

/// Extract the entity set of one entry. `id` is the source document's base
/// filename and becomes the Protein's `id`.
pub fn extract_entry(entry: &Record, id: &str) -> Result<ProteinEntry, SchemaError> {
    let protein = extract_protein(entry, id)?;
    let full_name = extract_full_name(entry)?;
    let organism = extract_organism(entry)?;

    let mut rejected = Vec::new();

    let mut features = Vec::new();
    for (index, item) in entry.field("feature").items().into_iter().enumerate() {
        match extract_feature(item, index) {
            Ok(feature) => features.push(feature),
            Err(e) => rejected.push(e),
        }
    }

    let mut genes = Vec::new();
    for (index, item) in gene_names(entry).into_iter().enumerate() {
        match extract_gene(item, index) {
            Ok(gene) => genes.push(gene),
            Err(e) => rejected.push(e),
        }
    }

    let mut references = Vec::new();
    for (index, item) in entry.field("reference").items().into_iter().enumerate() {
        match extract_reference(item, index) {
            Ok(reference) => references.push(reference),
            Err(e) => rejected.push(e),
        }
    }

    debug!(
        protein = %protein.name,
        id,
        features = features.len(),
        genes = genes.len(),
        references = references.len(),
        rejected = rejected.len(),
        "Extracted entry"
    );

    Ok(ProteinEntry {
        protein,
        full_name,
        organism,
        features,
        genes,
        references,
        rejected,
    })
}

fn extract_protein(entry: &Record, id: &str) -> Result<Protein, SchemaError> {
    let name = required_text(entry.field("name"), "Protein", "name")?;
    Ok(Protein {
        name: name.to_string(),
        id: id.to_string(),
    })
}

fn extract_full_name(entry: &Record) -> Result<FullName, SchemaError> {
    const PATH: &str = "protein/recommendedName/fullName";
    let name = required_text(entry.path(PATH), "FullName", PATH)?;
    Ok(FullName {
        name: name.to_string(),
    })
}

fn extract_organism(entry: &Record) -> Result<Organism, SchemaError> {
    let organism = entry
        .field("organism")
        .record()
        .ok_or_else(|| SchemaError::missing("Organism", "organism"))?;

    // `organism/name` is a sequence (scientific, common, synonym); the first wins.
    let name = organism.field("name").first();
    let name = required_text(name, "Organism", "organism/name")?;

    let db_references = organism.field("dbReference").items();
    let taxonomy = db_references
        .iter()
        .find(|item| attr(**item, "@type") == Some(TAXONOMY_DB))
        .or_else(|| db_references.first())
        .copied()
        .unwrap_or(Field::Absent);
    let taxonomy_id = required_text(
        taxonomy.record().map(|r| r.field("@id")).unwrap_or(Field::Absent),
        "Organism",
        "organism/dbReference/@id",
    )?;

    Ok(Organism {
        name: name.to_string(),
        taxonomy_id: taxonomy_id.to_string(),
    })
}

fn extract_feature(item: Field<'_>, index: usize) -> Result<Feature, SchemaError> {
    let path = format!("feature[{}]", index);
    let feature = item
        .record()
        .ok_or_else(|| SchemaError::invalid("Feature", &path, "expected an element with attributes"))?;

    let feature_type = required_text(feature.field("@type"), "Feature", format!("{}/@type", path))?;

    let location = feature
        .field("location")
        .record()
        .ok_or_else(|| SchemaError::missing("Feature", format!("{}/location", path)))?;

    // A range carries `begin`/`end`, a single residue carries `position`.
    let position = match (location.field("begin"), location.field("position")) {
        (Field::Absent, Field::Absent) => {
            return Err(SchemaError::invalid(
                "Feature",
                format!("{}/location", path),
                "neither 'begin' nor 'position' is present",
            ));
        }
        (begin, Field::Absent) => required_text(
            attr_field(begin, "@position"),
            "Feature",
            format!("{}/location/begin/@position", path),
        )?,
        (Field::Absent, position) => required_text(
            attr_field(position, "@position"),
            "Feature",
            format!("{}/location/position/@position", path),
        )?,
        (_, _) => {
            return Err(SchemaError::invalid(
                "Feature",
                format!("{}/location", path),
                "both 'begin' and 'position' are present",
            ));
        }
    };

    Ok(Feature::new(
        feature.field("@description").text(),
        feature_type,
        position,
    ))
}

/// All `gene/name` elements across every `gene` element, in document order.
fn gene_names(entry: &Record) -> Vec<Field<'_>> {
    entry
        .field("gene")
        .items()
        .into_iter()
        .filter_map(|gene| gene.record())
        .flat_map(|gene| gene.field("name").items())
        .collect()
}

fn extract_gene(item: Field<'_>, index: usize) -> Result<Gene, SchemaError> {
    let path = format!("gene/name[{}]", index);
    let name = required_text(item, "Gene", &path)?;
    let status = required_text(attr_field(item, "@type"), "Gene", format!("{}/@type", path))?;
    Ok(Gene {
        name: name.to_string(),
        status: status.to_string(),
    })
}

fn extract_reference(item: Field<'_>, index: usize) -> Result<Reference, SchemaError> {
    let path = format!("reference[{}]", index);
    let reference = item
        .record()
        .ok_or_else(|| SchemaError::invalid("Reference", &path, "expected an element with attributes"))?;

    let key = required_text(reference.field("@key"), "Reference", format!("{}/@key", path))?;
    let citation = reference
        .field("citation")
        .record()
        .ok_or_else(|| SchemaError::missing("Reference", format!("{}/citation", path)))?;
    let citation_type = required_text(citation.field("@type"), "Reference", format!("{}/citation/@type", path))?;

    let name = citation.field("@name").text().map(str::to_string);

    let authors = citation
        .path("authorList/person")
        .items()
        .into_iter()
        .map(|person| Author {
            name: attr(person, "@name").map(str::to_string),
        })
        .collect();

    Ok(Reference {
        name,
        citation_type: citation_type.to_string(),
        key: key.to_string(),
        authors,
    })
}

fn attr_field<'a>(item: Field<'a>, key: &str) -> Field<'a> {
    item.record().map(|r| r.field(key)).unwrap_or(Field::Absent)
}

fn attr<'a>(item: Field<'a>, key: &str) -> Option<&'a str> {
    attr_field(item, key).text()
}

fn required_text<'a>(
    field: Field<'a>,
    entity: &'static str,
    path: impl Into<String>,
) -> Result<&'a str, SchemaError> {
    match field {
        Field::Absent => Err(SchemaError::missing(entity, path)),
        present => present
            .text()
            .ok_or_else(|| SchemaError::invalid(entity, path, "expected text content")),
    }
}
