//! # Resource Registry
//!
//! Every resource command is data: a name, an API path, the verbs it supports, the
//! filters its `list`/`count` verbs accept and any nested resources
//! (`orders metafields`). The command tree is generated from this table and requests
//! are planned from it, so adding an endpoint never means writing a command body.
//!
//! Planning is pure: [`plan_request`] turns an [`Invocation`] into an [`ApiRequest`]
//! without touching the network. The binary either prints the plan (`--dry-run`) or
//! hands it to an [`ApiClient`](crate::api::ApiClient).

use crate::aliases::singular;
use crate::error::{Result, ShoplineError};
use crate::invocation::Invocation;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;

/// Largest accepted `--body-file`.
const MAX_BODY_SIZE: u64 = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    List,
    Get,
    Create,
    Update,
    Delete,
    Cancel,
    Count,
}

impl Verb {
    pub fn name(self) -> &'static str {
        match self {
            Verb::List => "list",
            Verb::Get => "get",
            Verb::Create => "create",
            Verb::Update => "update",
            Verb::Delete => "delete",
            Verb::Cancel => "cancel",
            Verb::Count => "count",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [
            Verb::List,
            Verb::Get,
            Verb::Create,
            Verb::Update,
            Verb::Delete,
            Verb::Cancel,
            Verb::Count,
        ]
        .into_iter()
        .find(|v| v.name() == name)
    }

    pub fn about(self, resource: &str) -> String {
        match self {
            Verb::List => format!("List {}", resource),
            Verb::Get => format!("Show one of {}", resource),
            Verb::Create => format!("Create one of {}", resource),
            Verb::Update => format!("Update one of {}", resource),
            Verb::Delete => format!("Delete one of {}", resource),
            Verb::Cancel => format!("Cancel one of {}", resource),
            Verb::Count => format!("Count {}", resource),
        }
    }

    /// Verbs that act on one record and take its id.
    pub fn takes_id(self) -> bool {
        matches!(self, Verb::Get | Verb::Update | Verb::Delete | Verb::Cancel)
    }

    /// Verbs that send a JSON body.
    pub fn takes_body(self) -> bool {
        matches!(self, Verb::Create | Verb::Update)
    }

    /// Verbs that take list filters.
    pub fn takes_filters(self) -> bool {
        matches!(self, Verb::List | Verb::Count)
    }

    /// Verbs that need confirmation unless `--yes` is given.
    pub fn is_destructive(self) -> bool {
        matches!(self, Verb::Delete | Verb::Cancel)
    }

    pub fn method(self) -> HttpMethod {
        match self {
            Verb::List | Verb::Get | Verb::Count => HttpMethod::Get,
            Verb::Create | Verb::Cancel => HttpMethod::Post,
            Verb::Update => HttpMethod::Put,
            Verb::Delete => HttpMethod::Delete,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// A `list`/`count` filter flag and the query parameter it becomes.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Filter {
    pub long: &'static str,
    pub param: &'static str,
    pub help: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Resource {
    pub name: &'static str,
    pub about: &'static str,
    /// Absolute for top-level resources, relative to the parent record for nested ones.
    pub path: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_prefix: Option<&'static str>,
    pub verbs: &'static [Verb],
    #[serde(skip_serializing_if = "is_empty")]
    pub filters: &'static [Filter],
    #[serde(skip_serializing_if = "is_empty")]
    pub nested: &'static [Resource],
}

impl Resource {
    /// Prefix used in formatted ID tokens, by default the singular of the name.
    pub fn prefix(&self) -> String {
        self.id_prefix
            .map(str::to_string)
            .unwrap_or_else(|| singular(self.name))
    }

    pub fn supports(&self, verb: Verb) -> bool {
        self.verbs.contains(&verb)
    }

    pub fn nested(&self, name: &str) -> Option<&'static Resource> {
        self.nested.iter().find(|n| n.name == name)
    }
}

fn is_empty<T>(items: &&[T]) -> bool {
    items.is_empty()
}

const fn filter(long: &'static str, param: &'static str, help: &'static str) -> Filter {
    Filter { long, param, help }
}

const CREATED_FROM: Filter = filter("from", "created_at_min", "Created at or after (ISO 8601)");
const CREATED_TO: Filter = filter("to", "created_at_max", "Created at or before (ISO 8601)");

const ALL_VERBS: &[Verb] = &[Verb::List, Verb::Get, Verb::Create, Verb::Update, Verb::Delete];
const READ_ONLY: &[Verb] = &[Verb::List, Verb::Get];

const METAFIELDS: Resource = Resource {
    name: "metafields",
    about: "Metafields attached to the parent record",
    path: "metafields",
    id_prefix: None,
    verbs: &[Verb::List, Verb::Get, Verb::Create, Verb::Update, Verb::Delete],
    filters: &[filter("namespace", "namespace", "Metafield namespace")],
    nested: &[],
};

pub const RESOURCES: &[Resource] = &[
    Resource {
        name: "orders",
        about: "Manage orders",
        path: "/orders",
        id_prefix: None,
        verbs: &[
            Verb::List,
            Verb::Get,
            Verb::Create,
            Verb::Update,
            Verb::Cancel,
            Verb::Count,
        ],
        filters: &[
            filter("status", "status", "Order status"),
            filter("email", "email", "Customer email"),
            filter("customer-id", "customer_id", "Customer ID"),
            CREATED_FROM,
            CREATED_TO,
        ],
        nested: &[METAFIELDS],
    },
    Resource {
        name: "products",
        about: "Manage products",
        path: "/products",
        id_prefix: None,
        verbs: &[
            Verb::List,
            Verb::Get,
            Verb::Create,
            Verb::Update,
            Verb::Delete,
            Verb::Count,
        ],
        filters: &[
            filter("status", "status", "Product status"),
            filter("title", "title", "Title contains"),
            filter("handle", "handle", "Product handle"),
            filter("collection-id", "collection_id", "Collection ID"),
        ],
        nested: &[METAFIELDS],
    },
    Resource {
        name: "customers",
        about: "Manage customers",
        path: "/customers",
        id_prefix: None,
        verbs: &[
            Verb::List,
            Verb::Get,
            Verb::Create,
            Verb::Update,
            Verb::Delete,
            Verb::Count,
        ],
        filters: &[
            filter("email", "email", "Email address"),
            filter("phone", "phone", "Phone number"),
            filter("name", "name", "Name contains"),
            CREATED_FROM,
            CREATED_TO,
        ],
        nested: &[METAFIELDS],
    },
    Resource {
        name: "customer-addresses",
        about: "Manage customer addresses",
        path: "/customer_addresses",
        id_prefix: Some("address"),
        verbs: ALL_VERBS,
        filters: &[filter("customer-id", "customer_id", "Customer ID")],
        nested: &[],
    },
    Resource {
        name: "draft-orders",
        about: "Manage draft orders",
        path: "/draft_orders",
        id_prefix: None,
        verbs: ALL_VERBS,
        filters: &[filter("status", "status", "Draft order status")],
        nested: &[],
    },
    Resource {
        name: "refunds",
        about: "Order refunds",
        path: "/refunds",
        id_prefix: None,
        verbs: &[Verb::List, Verb::Get, Verb::Create],
        filters: &[filter("order-id", "order_id", "Order ID")],
        nested: &[],
    },
    Resource {
        name: "fulfillments",
        about: "Order fulfillments",
        path: "/fulfillments",
        id_prefix: None,
        verbs: &[Verb::List, Verb::Get, Verb::Create, Verb::Cancel],
        filters: &[filter("order-id", "order_id", "Order ID")],
        nested: &[],
    },
    Resource {
        name: "transactions",
        about: "Payment transactions",
        path: "/transactions",
        id_prefix: Some("txn"),
        verbs: READ_ONLY,
        filters: &[filter("order-id", "order_id", "Order ID")],
        nested: &[],
    },
    Resource {
        name: "collections",
        about: "Manage collections",
        path: "/collections",
        id_prefix: None,
        verbs: ALL_VERBS,
        filters: &[
            filter("title", "title", "Title contains"),
            filter("handle", "handle", "Collection handle"),
        ],
        nested: &[],
    },
    Resource {
        name: "categories",
        about: "Manage product categories",
        path: "/categories",
        id_prefix: None,
        verbs: ALL_VERBS,
        filters: &[],
        nested: &[],
    },
    Resource {
        name: "inventory-levels",
        about: "Inventory levels per location",
        path: "/inventory_levels",
        id_prefix: None,
        verbs: &[Verb::List],
        filters: &[
            filter("location-id", "location_id", "Location ID"),
            filter("variant-id", "variant_id", "Variant ID"),
        ],
        nested: &[],
    },
    Resource {
        name: "locations",
        about: "Store locations",
        path: "/locations",
        id_prefix: None,
        verbs: READ_ONLY,
        filters: &[],
        nested: &[],
    },
    Resource {
        name: "gift-cards",
        about: "Manage gift cards",
        path: "/gift_cards",
        id_prefix: None,
        verbs: &[Verb::List, Verb::Get, Verb::Create, Verb::Update],
        filters: &[filter("status", "status", "Gift card status")],
        nested: &[],
    },
    Resource {
        name: "discount-codes",
        about: "Manage discount codes",
        path: "/discount_codes",
        id_prefix: Some("discount"),
        verbs: ALL_VERBS,
        filters: &[filter("status", "status", "Discount status")],
        nested: &[],
    },
    Resource {
        name: "media",
        about: "Store media library",
        path: "/media",
        id_prefix: None,
        verbs: &[Verb::List, Verb::Get, Verb::Create, Verb::Delete],
        filters: &[],
        nested: &[],
    },
    Resource {
        name: "medias",
        about: "Product media attachments",
        path: "/medias",
        id_prefix: Some("media"),
        verbs: READ_ONLY,
        filters: &[filter("product-id", "product_id", "Product ID")],
        nested: &[],
    },
    Resource {
        name: "token",
        about: "Inspect an access token",
        path: "/token",
        id_prefix: None,
        verbs: &[Verb::Get],
        filters: &[],
        nested: &[],
    },
    Resource {
        name: "tokens",
        about: "Manage storefront tokens",
        path: "/storefront/tokens",
        id_prefix: Some("token"),
        verbs: &[Verb::List, Verb::Create, Verb::Delete],
        filters: &[],
        nested: &[],
    },
    Resource {
        name: "webhooks",
        about: "Manage webhook subscriptions",
        path: "/webhooks",
        id_prefix: None,
        verbs: ALL_VERBS,
        filters: &[filter("topic", "topic", "Webhook topic")],
        nested: &[],
    },
    Resource {
        name: "conversations",
        about: "Customer conversations",
        path: "/conversations",
        id_prefix: None,
        verbs: READ_ONLY,
        filters: &[filter("customer-id", "customer_id", "Customer ID")],
        nested: &[],
    },
];

pub fn find_resource(name: &str) -> Option<&'static Resource> {
    RESOURCES.iter().find(|r| r.name == name)
}

/// The registry entry a canonical command path refers to.
#[derive(Debug, Clone, Copy)]
pub struct Target {
    pub resource: &'static Resource,
    /// The top-level resource when `resource` is nested.
    pub parent: Option<&'static Resource>,
    pub verb: Verb,
}

impl Target {
    /// Resolves `[resource, verb]` or `[resource, nested, verb]`.
    pub fn from_path(path: &[String]) -> Option<Self> {
        match path {
            [resource, verb] => {
                let resource = find_resource(resource)?;
                let verb = Verb::from_name(verb).filter(|v| resource.supports(*v))?;
                Some(Self {
                    resource,
                    parent: None,
                    verb,
                })
            }
            [parent, nested, verb] => {
                let parent = find_resource(parent)?;
                let resource = parent.nested(nested)?;
                let verb = Verb::from_name(verb).filter(|v| resource.supports(*v))?;
                Some(Self {
                    resource,
                    parent: Some(parent),
                    verb,
                })
            }
            _ => None,
        }
    }

    /// Names of the positional arguments, in order.
    pub fn positionals(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(parent) = self.parent {
            out.push(format!("{}-id", singular(parent.name)));
        }
        if self.verb.takes_id() {
            out.push("id".to_string());
        }
        out
    }
}

/// A planned API call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub query: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// Percent-encodes one path segment.
fn segment(id: &str) -> String {
    url::form_urlencoded::byte_serialize(id.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn required_arg(inv: &Invocation, name: &str) -> Result<String> {
    inv.string(name)?
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ShoplineError::Usage(format!("missing required argument <{}>", name)))
}

/// Reads the JSON body from `--body` or `--body-file` (`-` reads `input`).
pub fn read_body(inv: &Invocation, input: &mut dyn Read) -> Result<Option<Value>> {
    let inline = inv.string("body")?.filter(|b| !b.trim().is_empty());
    let file = inv.string("body-file")?.filter(|f| !f.trim().is_empty());

    let raw = match (inline, file) {
        (Some(_), Some(_)) => {
            return Err(ShoplineError::Usage(
                "--body and --body-file cannot be used together (use one)".into(),
            ))
        }
        (Some(body), None) => body,
        (None, Some(path)) => {
            let mut buf = String::new();
            if path.trim() == "-" {
                input.take(MAX_BODY_SIZE + 1).read_to_string(&mut buf)?;
            } else {
                fs::File::open(path.trim())?
                    .take(MAX_BODY_SIZE + 1)
                    .read_to_string(&mut buf)?;
            }
            if buf.len() as u64 > MAX_BODY_SIZE {
                return Err(ShoplineError::Usage(format!(
                    "--body-file too large (max {} bytes)",
                    MAX_BODY_SIZE
                )));
            }
            buf
        }
        (None, None) => return Ok(None),
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| ShoplineError::Usage(format!("invalid JSON body: {}", e)))
}

/// Plans the request for a resource invocation.
pub fn plan_request(target: &Target, inv: &Invocation, input: &mut dyn Read) -> Result<ApiRequest> {
    let mut path = match target.parent {
        Some(parent) => {
            let parent_key = format!("{}-id", singular(parent.name));
            let parent_id = required_arg(inv, &parent_key)?;
            format!(
                "{}/{}/{}",
                parent.path,
                segment(&parent_id),
                target.resource.path
            )
        }
        None => target.resource.path.to_string(),
    };

    if target.verb.takes_id() {
        path = format!("{}/{}", path, segment(&required_arg(inv, "id")?));
    }
    match target.verb {
        Verb::Cancel => path.push_str("/cancel"),
        Verb::Count => path.push_str("/count"),
        _ => {}
    }

    let mut query = BTreeMap::new();
    if target.verb == Verb::List {
        if let Some(page) = inv.u32("page")?.filter(|p| *p > 0) {
            query.insert("page".to_string(), page.to_string());
        }
        if let Some(size) = inv.u32("page-size")?.filter(|s| *s > 0) {
            query.insert("page_size".to_string(), size.to_string());
        }
        if let Some(sort_by) = inv.globals.sort_by.as_deref().filter(|s| !s.is_empty()) {
            query.insert("sort_by".to_string(), sort_by.to_string());
            let order = if inv.globals.desc { "desc" } else { "asc" };
            query.insert("sort_order".to_string(), order.to_string());
        }
    }
    if target.verb.takes_filters() {
        for f in target.resource.filters {
            if let Some(value) = inv.string(f.long)?.filter(|v| !v.is_empty()) {
                query.insert(f.param.to_string(), value);
            }
        }
    }

    let body = if target.verb.takes_body() {
        let body = read_body(inv, input)?;
        if body.is_none() && target.verb == Verb::Create {
            return Err(ShoplineError::Usage(
                "create needs a JSON body (--body or --body-file)".into(),
            ));
        }
        body
    } else {
        None
    };

    Ok(ApiRequest {
        method: target.verb.method(),
        path,
        query,
        body,
    })
}
