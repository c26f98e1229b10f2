//! `junos_application`: custom application definitions.

use crate::resources::object::{ConfigObject, Field};
use crate::resources::schema::{Attribute, Schema, Validator};

/// Options of `applications application <name>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationOptions {
    pub name: String,
    pub application_protocol: String,
    pub description: String,
    pub destination_port: String,
    pub ether_type: String,
    pub inactivity_timeout: i64,
    pub protocol: String,
    pub rpc_program_number: String,
    pub source_port: String,
    pub uuid: String,
}

impl ConfigObject for ApplicationOptions {
    const RESOURCE_TYPE: &'static str = "junos_application";
    const DESCRIPTION: &'static str = "application";
    const PATH: &'static str = "applications application";
    const FIELDS: &'static [Field<Self>] = &[
        Field::string(
            "application_protocol",
            "application-protocol",
            |o: &Self| o.application_protocol.clone(),
            |o: &mut Self, v: String| o.application_protocol = v,
        ),
        Field::string(
            "description",
            "description",
            |o: &Self| o.description.clone(),
            |o: &mut Self, v: String| o.description = v,
        )
        .quoted(),
        Field::string(
            "destination_port",
            "destination-port",
            |o: &Self| o.destination_port.clone(),
            |o: &mut Self, v: String| o.destination_port = v,
        ),
        Field::string(
            "ether_type",
            "ether-type",
            |o: &Self| o.ether_type.clone(),
            |o: &mut Self, v: String| o.ether_type = v,
        ),
        Field::int(
            "inactivity_timeout",
            "inactivity-timeout",
            |o: &Self| o.inactivity_timeout,
            |o: &mut Self, v: i64| o.inactivity_timeout = v,
        ),
        Field::string(
            "protocol",
            "protocol",
            |o: &Self| o.protocol.clone(),
            |o: &mut Self, v: String| o.protocol = v,
        ),
        Field::string(
            "rpc_program_number",
            "rpc-program-number",
            |o: &Self| o.rpc_program_number.clone(),
            |o: &mut Self, v: String| o.rpc_program_number = v,
        ),
        Field::string(
            "source_port",
            "source-port",
            |o: &Self| o.source_port.clone(),
            |o: &mut Self, v: String| o.source_port = v,
        ),
        Field::string(
            "uuid",
            "uuid",
            |o: &Self| o.uuid.clone(),
            |o: &mut Self, v: String| o.uuid = v,
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
                    .with_validator(Validator::NameObject { max_len: 63 }),
            )
            .with_attribute("application_protocol", Attribute::optional_string())
            .with_attribute(
                "description",
                Attribute::optional_string()
                    .with_validator(Validator::StringLength { min: 1, max: 900 }),
            )
            .with_attribute("destination_port", Attribute::optional_string())
            .with_attribute(
                "ether_type",
                Attribute::optional_string().with_validator(Validator::Regex {
                    pattern: r"^0[xX][0-9a-fA-F]{4}$",
                    message: "must be in hex (example: 0x8906)",
                }),
            )
            .with_attribute(
                "inactivity_timeout",
                Attribute::optional_int().with_validator(Validator::IntBetween { min: 4, max: 86400 }),
            )
            .with_attribute("protocol", Attribute::optional_string())
            .with_attribute(
                "rpc_program_number",
                Attribute::optional_string().with_validator(Validator::Regex {
                    pattern: r"^\d+(-\d+)?$",
                    message: "must be an integer or a range of integers",
                }),
            )
            .with_attribute("source_port", Attribute::optional_string())
            .with_attribute(
                "uuid",
                Attribute::optional_string().with_validator(Validator::Regex {
                    pattern: r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$",
                    message: "must be of the form xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx",
                }),
            )
    }
}
