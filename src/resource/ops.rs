//! Generic search/get operations shared by every resource kind.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use super::descriptor::ResourceDescriptor;
use super::object::ResourceObject;
use super::transaction::rest_transaction;
use crate::error::{AtTaskError, Result};
use crate::session::Session;
use crate::transport::Params;

/// Operations on one resource kind, dispatched through a session.
#[derive(Debug, Clone, Copy)]
pub struct Resources<'a> {
    session: &'a Session,
    descriptor: &'static ResourceDescriptor,
}

impl<'a> Resources<'a> {
    pub fn new(session: &'a Session, descriptor: &'static ResourceDescriptor) -> Self {
        Self {
            session,
            descriptor,
        }
    }

    pub fn descriptor(&self) -> &'static ResourceDescriptor {
        self.descriptor
    }

    /// `<api url>/<endpoint>`.
    pub fn endpoint_url(&self) -> String {
        format!("{}/{}", self.session.url(), self.descriptor.endpoint)
    }

    /// Build an object from a server payload.
    ///
    /// Only recognized fields are kept, keyed by their lower-cased name. An
    /// unexpected `objCode` is logged, not rejected.
    pub fn from_json(&self, payload: &Value) -> Result<ResourceObject> {
        from_json(self.descriptor, payload)
    }

    /// Search this kind. `search_fields` and `params` travel together as
    /// query parameters; on a key collision `params` wins.
    ///
    /// Objects are returned in server order.
    pub fn search(&self, search_fields: &Params, params: &Params) -> Result<Vec<ResourceObject>> {
        self.session.require_authenticated("search")?;

        let merged = merge_params(search_fields, params);
        let url = format!("{}/search", self.endpoint_url());
        let response = rest_transaction(self.session, "get", &url, &merged)?;

        let objects = match response.get("data") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    debug!(item = %item, "Converting search result");
                    self.from_json(item)
                })
                .collect::<Result<Vec<_>>>()?,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => return Err(AtTaskError::ApiShape(other.clone())),
        };

        info!(kind = self.descriptor.name, count = objects.len(), "Search returned");
        Ok(objects)
    }

    /// Fetch one object by ID. With `all_fields` every recognized field is
    /// requested through the `fields` parameter.
    pub fn get(&self, id: &str, all_fields: bool, params: &Params) -> Result<ResourceObject> {
        self.session.require_authenticated("get")?;

        let mut params = params.clone();
        if all_fields {
            params.insert("fields".to_string(), self.descriptor.field_list());
        }

        let url = format!("{}/{}", self.endpoint_url(), id);
        let response = rest_transaction(self.session, "get", &url, &params)?;
        let data = response.get("data").unwrap_or(&Value::Null);
        let object = self.from_json(data)?;

        info!(object = %object, "Get returned");
        Ok(object)
    }
}

/// Build an object of `descriptor`'s kind from a server payload.
pub fn from_json(descriptor: &'static ResourceDescriptor, payload: &Value) -> Result<ResourceObject> {
    let fields: &Map<String, Value> = payload
        .as_object()
        .ok_or_else(|| AtTaskError::ApiShape(payload.clone()))?;

    let obj_code = fields.get("objCode").and_then(Value::as_str);
    if obj_code != Some(descriptor.obj_code) {
        error!(
            expected = descriptor.obj_code,
            found = ?obj_code,
            "Payload objCode does not match resource kind"
        );
    }

    let mut attrs = IndexMap::new();
    for (key, value) in fields {
        if descriptor.recognizes(key) {
            attrs.insert(key.to_lowercase(), value.clone());
        } else {
            warn!(
                kind = descriptor.name,
                field = %key,
                value = %value,
                "Field found in JSON but not recognized"
            );
        }
    }

    Ok(ResourceObject::from_attrs(descriptor, attrs))
}

/// Merge search fields with request parameters; `params` wins on collision.
pub fn merge_params(search_fields: &Params, params: &Params) -> Params {
    let mut merged = search_fields.clone();
    for (key, value) in params {
        merged.insert(key.clone(), value.clone());
    }
    merged
}
