//! `junos_security_ike_proposal`: IKE phase 1 proposals.

use crate::junos::{check_compatibility_security, SystemInformation};
use crate::resources::object::{ConfigObject, Field};
use crate::resources::schema::{Attribute, Schema, Validator};

const DH_GROUPS: &[&str] = &[
    "group1", "group2", "group5", "group14", "group15", "group16", "group19", "group20",
    "group21", "group24",
];

/// Options of `security ike proposal <name>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IkeProposalOptions {
    pub name: String,
    pub authentication_algorithm: String,
    pub authentication_method: String,
    pub dh_group: String,
    pub encryption_algorithm: String,
    pub lifetime_seconds: i64,
}

impl ConfigObject for IkeProposalOptions {
    const RESOURCE_TYPE: &'static str = "junos_security_ike_proposal";
    const DESCRIPTION: &'static str = "security ike proposal";
    const PATH: &'static str = "security ike proposal";
    const FIELDS: &'static [Field<Self>] = &[
        Field::string(
            "authentication_algorithm",
            "authentication-algorithm",
            |o: &Self| o.authentication_algorithm.clone(),
            |o: &mut Self, v: String| o.authentication_algorithm = v,
        ),
        Field::string(
            "authentication_method",
            "authentication-method",
            |o: &Self| o.authentication_method.clone(),
            |o: &mut Self, v: String| o.authentication_method = v,
        ),
        Field::string(
            "dh_group",
            "dh-group",
            |o: &Self| o.dh_group.clone(),
            |o: &mut Self, v: String| o.dh_group = v,
        ),
        Field::string(
            "encryption_algorithm",
            "encryption-algorithm",
            |o: &Self| o.encryption_algorithm.clone(),
            |o: &mut Self, v: String| o.encryption_algorithm = v,
        ),
        Field::int(
            "lifetime_seconds",
            "lifetime-seconds",
            |o: &Self| o.lifetime_seconds,
            |o: &mut Self, v: i64| o.lifetime_seconds = v,
        ),
    ];

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn schema() -> Schema {
        Schema::v0()
            .with_attribute(
                "name",
                Attribute::required_string()
                    .force_new()
                    .with_validator(Validator::NameObject { max_len: 32 }),
            )
            .with_attribute("authentication_algorithm", Attribute::optional_string())
            .with_attribute(
                "authentication_method",
                Attribute::optional_string().with_default("pre-shared-keys"),
            )
            .with_attribute(
                "dh_group",
                Attribute::optional_string()
                    .with_validator(Validator::StringInSlice { values: DH_GROUPS }),
            )
            .with_attribute("encryption_algorithm", Attribute::optional_string())
            .with_attribute(
                "lifetime_seconds",
                Attribute::optional_int()
                    .with_validator(Validator::IntBetween { min: 180, max: 86400 }),
            )
    }

    fn check_compatibility(info: &SystemInformation) -> bool {
        check_compatibility_security(info)
    }
}
