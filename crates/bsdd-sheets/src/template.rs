//! Entity templates
//!
//! A template is the closed list of fields one kind of bSDD object may carry,
//! in output order, each with its default. Every mapped row starts from a
//! fresh copy of its template; no template value is ever shared between rows.

use std::fmt;

use serde_json::{Map, Value};

/// Default value of a template field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    /// `null`, overwritten by the cell when the column is present
    Null,
    /// `[]`, filled by the linker or by top-level attachment
    EmptyList,
}

impl FieldDefault {
    fn to_value(self) -> Value {
        match self {
            FieldDefault::Null => Value::Null,
            FieldDefault::EmptyList => Value::Array(Vec::new()),
        }
    }
}

use FieldDefault::{EmptyList as L, Null as N};

/// The kinds of object a bSDD template workbook describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Domain,
    Classification,
    Material,
    Property,
    ClassificationProperty,
    ClassificationRelation,
    AllowedValue,
    PropertyRelation,
}

impl EntityKind {
    /// Every kind, in loading order
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Domain,
        EntityKind::Classification,
        EntityKind::Material,
        EntityKind::Property,
        EntityKind::ClassificationProperty,
        EntityKind::ClassificationRelation,
        EntityKind::AllowedValue,
        EntityKind::PropertyRelation,
    ];

    /// Name of the workbook sheet holding rows of this kind
    pub fn sheet_name(self) -> &'static str {
        match self {
            EntityKind::Domain => "Domain",
            EntityKind::Classification => "Classification",
            EntityKind::Material => "Material",
            EntityKind::Property => "Property",
            EntityKind::ClassificationProperty => "ClassificationProperty",
            EntityKind::ClassificationRelation => "ClassificationRelation",
            EntityKind::AllowedValue => "PropertyValue",
            EntityKind::PropertyRelation => "PropertyRelation",
        }
    }

    /// Field that names the parent of a child row, `None` for kinds that are
    /// not linked
    pub fn origin_field(self) -> Option<&'static str> {
        match self {
            EntityKind::ClassificationProperty | EntityKind::ClassificationRelation => {
                Some(ORIGIN_CLASSIFICATION)
            }
            EntityKind::AllowedValue => Some(ORIGIN_PROPERTY_OR_CLASSIFICATION_PROPERTY),
            EntityKind::PropertyRelation => Some(ORIGIN_PROPERTY),
            _ => None,
        }
    }

    /// Template for this kind
    pub fn template(self) -> &'static Template {
        match self {
            EntityKind::Domain => &DOMAIN,
            EntityKind::Classification => &CLASSIFICATION,
            EntityKind::Material => &MATERIAL,
            EntityKind::Property => &PROPERTY,
            EntityKind::ClassificationProperty => &CLASSIFICATION_PROPERTY,
            EntityKind::ClassificationRelation => &CLASSIFICATION_RELATION,
            EntityKind::AllowedValue => &ALLOWED_VALUE,
            EntityKind::PropertyRelation => &PROPERTY_RELATION,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::AllowedValue => "AllowedValue",
            other => other.sheet_name(),
        };
        f.write_str(name)
    }
}

/// Origin field of ClassificationProperty and ClassificationRelation rows
pub const ORIGIN_CLASSIFICATION: &str = "(Origin Classification Code)";
/// Origin field of AllowedValue rows
pub const ORIGIN_PROPERTY_OR_CLASSIFICATION_PROPERTY: &str =
    "(Origin Property Code OR ClassificationProperty Code)";
/// Origin field of PropertyRelation rows
pub const ORIGIN_PROPERTY: &str = "(Origin Property)";

/// Ordered field whitelist of one entity kind
#[derive(Debug)]
pub struct Template {
    kind: EntityKind,
    fields: &'static [(&'static str, FieldDefault)],
}

impl Template {
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Field names in output order
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(name, _)| *name)
    }

    /// Whether `field` is part of this template
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|(name, _)| *name == field)
    }

    /// Whether `field` defaults to a list
    pub fn is_list_field(&self, field: &str) -> bool {
        self.fields
            .iter()
            .any(|(name, default)| *name == field && *default == FieldDefault::EmptyList)
    }

    /// A fresh object holding every field's default, in template order
    pub fn instantiate(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|(name, default)| (name.to_string(), default.to_value()))
            .collect()
    }
}

static DOMAIN: Template = Template {
    kind: EntityKind::Domain,
    fields: &[
        ("ModelVersion", N),
        ("OrganizationCode", N),
        ("DomainCode", N),
        ("DomainVersion", N),
        ("DomainName", N),
        ("ReleaseDate", N),
        ("Status", N),
        ("LanguageIsoCode", N),
        ("LanguageOnly", N),
        ("UseOwnUri", N),
        ("DomainNamespaceUri", N),
        ("License", N),
        ("LicenseUrl", N),
        ("ChangeRequestEmailAddress", N),
        ("MoreInfoUrl", N),
        ("QualityAssuranceProcedure", N),
        ("QualityAssuranceProcedureUrl", N),
        ("Classifications", L),
        ("Materials", L),
        ("Properties", L),
    ],
};

static CLASSIFICATION: Template = Template {
    kind: EntityKind::Classification,
    fields: &[
        ("Code", N),
        ("Name", N),
        ("ClassificationType", N),
        ("Definition", N),
        ("Description", N),
        ("ParentClassificationCode", N),
        ("RelatedIfcEntityNamesList", N),
        ("Synonyms", N),
        ("ActivationDateUtc", N),
        ("ReferenceCode", N),
        ("CountriesOfUse", N),
        ("CountryOfOrigin", N),
        ("CreatorLanguageIsoCode", N),
        ("DeActivationDateUtc", N),
        ("DeprecationExplanation", N),
        ("DocumentReference", N),
        ("OwnedUri", N),
        ("ReplacedObjectCodes", N),
        ("ReplacingObjectCodes", N),
        ("RevisionDateUtc", N),
        ("RevisionNumber", N),
        ("Status", N),
        ("SubdivisionsOfUse", N),
        ("Uid", N),
        ("VersionDateUtc", N),
        ("VersionNumber", N),
        ("VisualRepresentationUri", N),
        ("ClassificationProperties", L),
        ("ClassificationRelations", L),
        ("AllowedValues", L),
    ],
};

static MATERIAL: Template = Template {
    kind: EntityKind::Material,
    fields: &[
        ("Code", N),
        ("Name", N),
        ("ClassificationType", N),
        ("Definition", N),
        ("Description", N),
        ("ParentClassificationCode", N),
        ("RelatedIfcEntityNamesList", N),
        ("Synonyms", N),
        ("ActivationDateUtc", N),
        ("ReferenceCode", N),
        ("CountriesOfUse", N),
        ("CountryOfOrigin", N),
        ("CreatorLanguageIsoCode", N),
        ("DeActivationDateUtc", N),
        ("DeprecationExplanation", N),
        ("DocumentReference", N),
        ("OwnedUri", N),
        ("ReplacedObjectCodes", N),
        ("ReplacingObjectCodes", N),
        ("RevisionDateUtc", N),
        ("RevisionNumber", N),
        ("Status", N),
        ("SubdivisionsOfUse", N),
        ("Uid", N),
        ("VersionDateUtc", N),
        ("VersionNumber", N),
        ("VisualRepresentationUri", N),
    ],
};

static PROPERTY: Template = Template {
    kind: EntityKind::Property,
    fields: &[
        ("Code", N),
        ("Name", N),
        ("Definition", N),
        ("Description", N),
        ("ConnectedPropertyCodes", N),
        ("CountriesOfUse", N),
        ("CountryOfOrigin", N),
        ("CreatorLanguageIsoCode", N),
        ("DataType", N),
        ("DeActivationDateUtc", N),
        ("DeprecationExplanation", N),
        ("Dimension", N),
        ("DimensionLength", N),
        ("DimensionMass", N),
        ("DimensionTime", N),
        ("DimensionElectricCurrent", N),
        ("DimensionThermodynamicTemperature", N),
        ("DimensionAmountOfSubstance", N),
        ("DimensionLuminousIntensity", N),
        ("DocumentReference", N),
        ("DynamicParameterPropertyCodes", N),
        ("Example", N),
        ("IsDynamic", N),
        ("MaxExclusive", N),
        ("MaxInclusive", N),
        ("MinExclusive", N),
        ("MinInclusive", N),
        ("MethodOfMeasurement", N),
        ("OwnedUri", N),
        ("Pattern", N),
        ("PhysicalQuantity", N),
        ("PropertyValueKind", N),
        ("ReplacedObjectCodes", N),
        ("ReplacingObjectCodes", N),
        ("RevisionDateUtc", N),
        ("RevisionNumber", N),
        ("Status", N),
        ("SubdivisionsOfUse", N),
        ("TextFormat", N),
        ("Uid", N),
        ("Units", N),
        ("VersionDateUtc", N),
        ("VersionNumber", N),
        ("VisualRepresentationUri", N),
        ("ActivationDateUtc", N),
        ("AllowedValues", L),
        ("PropertyRelations", L),
    ],
};

static CLASSIFICATION_PROPERTY: Template = Template {
    kind: EntityKind::ClassificationProperty,
    fields: &[
        (ORIGIN_CLASSIFICATION, N),
        ("Code", N),
        ("PropertyCode", N),
        ("PropertyUri", N),
        ("Description", N),
        ("PropertySet", N),
        ("Unit", N),
        ("PredefinedValue", N),
        ("IsRequired", N),
        ("IsWritable", N),
        ("MaxExclusive", N),
        ("MaxInclusive", N),
        ("MinExclusive", N),
        ("MinInclusive", N),
        ("Pattern", N),
        ("PropertyType", N),
        ("SortNumber", N),
        ("Symbol", N),
        ("AllowedValues", L),
    ],
};

static CLASSIFICATION_RELATION: Template = Template {
    kind: EntityKind::ClassificationRelation,
    fields: &[
        (ORIGIN_CLASSIFICATION, N),
        ("RelationType", N),
        ("RelatedClassificationUri", N),
        ("RelatedClassificationName", N),
        ("Fraction", N),
    ],
};

static ALLOWED_VALUE: Template = Template {
    kind: EntityKind::AllowedValue,
    fields: &[
        (ORIGIN_PROPERTY_OR_CLASSIFICATION_PROPERTY, N),
        ("Code", N),
        ("Value", N),
        ("Description", N),
        ("Uri", N),
        ("SortNumber", N),
        ("OwnedUri", N),
    ],
};

static PROPERTY_RELATION: Template = Template {
    kind: EntityKind::PropertyRelation,
    fields: &[
        (ORIGIN_PROPERTY, N),
        ("RelatedPropertyName", N),
        ("RelatedPropertyUri", N),
        ("RelationType", N),
        ("OwnedUri", N),
    ],
};
