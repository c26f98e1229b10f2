//! `junos_security_ipsec_proposal`: IPsec phase 2 proposals.

use crate::junos::{check_compatibility_security, SystemInformation};
use crate::resources::object::{ConfigObject, Field};
use crate::resources::schema::{Attribute, Schema, Validator};

/// Options of `security ipsec proposal <name>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpsecProposalOptions {
    pub name: String,
    pub authentication_algorithm: String,
    pub encryption_algorithm: String,
    pub lifetime_seconds: i64,
    pub lifetime_kilobytes: i64,
    pub protocol: String,
}

impl ConfigObject for IpsecProposalOptions {
    const RESOURCE_TYPE: &'static str = "junos_security_ipsec_proposal";
    const DESCRIPTION: &'static str = "security ipsec proposal";
    const PATH: &'static str = "security ipsec proposal";
    const FIELDS: &'static [Field<Self>] = &[
        Field::string(
            "authentication_algorithm",
            "authentication-algorithm",
            |o: &Self| o.authentication_algorithm.clone(),
            |o: &mut Self, v: String| o.authentication_algorithm = v,
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
        Field::int(
            "lifetime_kilobytes",
            "lifetime-kilobytes",
            |o: &Self| o.lifetime_kilobytes,
            |o: &mut Self, v: i64| o.lifetime_kilobytes = v,
        ),
        Field::string(
            "protocol",
            "protocol",
            |o: &Self| o.protocol.clone(),
            |o: &mut Self, v: String| o.protocol = v,
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
            .with_attribute("encryption_algorithm", Attribute::optional_string())
            .with_attribute(
                "lifetime_seconds",
                Attribute::optional_int()
                    .with_validator(Validator::IntBetween { min: 180, max: 86400 }),
            )
            .with_attribute(
                "lifetime_kilobytes",
                Attribute::optional_int().with_validator(Validator::IntBetween {
                    min: 64,
                    max: 4_294_967_294,
                }),
            )
            .with_attribute(
                "protocol",
                Attribute::optional_string()
                    .with_validator(Validator::StringInSlice { values: &["esp", "ah"] }),
            )
    }

    fn check_compatibility(info: &SystemInformation) -> bool {
        check_compatibility_security(info)
    }
}
