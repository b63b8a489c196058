//! # Schema Registry
//!
//! Process-wide, read-mostly descriptor store: built once at startup from
//! loader output, immutable afterward, and shared by reference into every
//! request handler. Concurrent readers need no lock because no writer
//! exists after construction.
//!
//! Operation-level validation lives here: structural lookups (schema file →
//! service → operation) short-circuit with a single fatal error, while field
//! errors accumulate across all arguments.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::descriptor::{OperationDescriptor, SchemaDescriptor, ServiceDescriptor, StructTable};
use crate::error::{ErrorCode, ExtractError, RequestError};
use crate::extract::extract_schema;
use crate::raw::RawSchema;
use crate::validate::validate_value;
use crate::value::Value;

/// One row of the service listing the HTTP surface exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceListing {
    /// The schema file name.
    pub thrift: String,
    /// The service name.
    pub service: String,
    /// Sorted operation names.
    pub methods: Vec<String>,
}

/// Descriptors and raw source for every loaded schema file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, SchemaDescriptor>,
    sources: BTreeMap<String, String>,
}

impl SchemaRegistry {
    /// Build a registry by extracting every loaded schema file.
    ///
    /// `files` yields `(file name, raw metadata, verbatim source text)`
    /// triples as produced by the IDL loader.
    pub fn build<I>(files: I) -> Result<Self, ExtractError>
    where
        I: IntoIterator<Item = (String, RawSchema, String)>,
    {
        let mut schemas = BTreeMap::new();
        let mut sources = BTreeMap::new();
        for (file, raw, source) in files {
            let schema = extract_schema(&file, &raw)?;
            schemas.insert(file.clone(), schema);
            sources.insert(file, source);
        }
        Ok(Self { schemas, sources })
    }

    /// The descriptors for one schema file.
    pub fn schema(&self, file: &str) -> Option<&SchemaDescriptor> {
        self.schemas.get(file)
    }

    /// The verbatim source text of one schema file, for definition display.
    pub fn source(&self, file: &str) -> Option<&str> {
        self.sources.get(file).map(String::as_str)
    }

    /// One service of one schema file.
    pub fn service(&self, file: &str, service: &str) -> Option<&ServiceDescriptor> {
        self.schemas.get(file)?.services.get(service)
    }

    /// Every (schema file, service) pair with its sorted operation names,
    /// ordered by file then service.
    pub fn listings(&self) -> Vec<ServiceListing> {
        self.schemas
            .values()
            .flat_map(|schema| {
                schema.services.values().map(|service| ServiceListing {
                    thrift: schema.schema_file.clone(),
                    service: service.name.clone(),
                    methods: service.operation_names(),
                })
            })
            .collect()
    }

    /// Resolve one operation, reporting the first structural failure.
    ///
    /// Structural errors are fatal to a request and never combined with
    /// field errors.
    pub fn lookup(
        &self,
        file: &str,
        service: &str,
        operation: &str,
    ) -> Result<(&SchemaDescriptor, &OperationDescriptor), RequestError> {
        let schema = self.schemas.get(file).ok_or_else(|| {
            RequestError::structural(
                ErrorCode::ThriftNotLoaded,
                format!("Thrift '{file}' not found"),
            )
        })?;
        let svc = schema.services.get(service).ok_or_else(|| {
            RequestError::structural(
                ErrorCode::ServiceNotInThrift,
                format!("Service '{service}' not found"),
            )
        })?;
        let op = svc.operations.get(operation).ok_or_else(|| {
            RequestError::structural(
                ErrorCode::EndpointNotInService,
                format!("Method '{operation}' not found"),
            )
        })?;
        Ok((schema, op))
    }

    /// Validate a request body against one operation.
    ///
    /// On success returns the operation and the schema's struct table (for
    /// the translation that follows). On failure returns either the single
    /// structural error or every accumulated field error.
    pub fn validate_call(
        &self,
        file: &str,
        service: &str,
        operation: &str,
        body: &Value,
    ) -> Result<(&OperationDescriptor, &StructTable), Vec<RequestError>> {
        let (schema, op) = self
            .lookup(file, service, operation)
            .map_err(|err| vec![err])?;

        if !matches!(body, Value::Map(_)) {
            return Err(vec![RequestError::invalid_request(format!(
                "request_body must be an object, got {}",
                body.kind()
            ))]);
        }

        let mut errors = Vec::new();
        for arg in &op.args {
            match body.get(&arg.name) {
                Some(value) => {
                    for msg in validate_value(value, &arg.ty, &schema.structs) {
                        errors.push(RequestError::field_invalid(
                            arg,
                            format!("Error with field '{}': {msg}", arg.name),
                        ));
                    }
                }
                None if arg.required => errors.push(RequestError::required_missing(arg)),
                None => {}
            }
        }

        if errors.is_empty() {
            Ok((op, &schema.structs))
        } else {
            Err(errors)
        }
    }
}
