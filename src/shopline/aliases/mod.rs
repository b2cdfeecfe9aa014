//! # Alias Tables
//!
//! Short-hand spellings for commands and flags. Everything in this module is static
//! data plus lookups; the code that mutates the command tree lives in [`tree`] and
//! [`crate::flags`].
//!
//! Two scopes exist for command aliases:
//!
//! - **Verb aliases** apply to any command whose name matches, at any depth
//!   (`orders l` → `orders list`, `orders mf list` → `orders metafields list`).
//! - **Resource aliases** apply only to direct children of the root
//!   (`o` → `orders`). Top-level resources additionally get their singular form
//!   (`product` → `products`), see [`singular`].
//!
//! Candidates are only suggestions: a candidate that would collide with a sibling is
//! dropped when the tree is aliased.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub mod singular;
pub mod tree;

pub use singular::singular;
pub use tree::{add_alias_if_safe, apply_aliases};

type AliasTable = &'static [(&'static str, &'static [&'static str])];

const VERB_ALIASES: AliasTable = &[
    ("list", &["ls", "l"]),
    ("get", &["show", "g"]),
    ("show", &["g"]),
    ("create", &["new", "add", "mk"]),
    ("update", &["edit", "up"]),
    ("edit", &["up"]),
    ("delete", &["del", "rm"]),
    ("remove", &["rm"]),
    ("cancel", &["void"]),
    ("search", &["find", "q"]),
    ("query", &["q"]),
    ("find", &["q"]),
    ("count", &["cnt"]),
    ("login", &["signin", "sign-in"]),
    ("logout", &["signout", "sign-out"]),
    ("close", &["cl"]),
    ("reopen", &["re"]),
    ("complete", &["cpl"]),
    ("publish", &["pub"]),
    ("adjust", &["adj"]),
    ("send-recovery", &["sr"]),
    ("info", &["i"]),
    ("settings", &["cfg"]),
    ("status", &["stat"]),
    // subcommand nouns
    ("action-logs", &["al"]),
    ("activate", &["on"]),
    ("assign", &["asg"]),
    ("capture", &["cap"]),
    ("children", &["chi"]),
    ("comments", &["cmt"]),
    ("deactivate", &["off"]),
    ("domains", &["dom"]),
    ("enable", &["ena"]),
    ("events", &["ev"]),
    ("exchange", &["xch"]),
    ("execute", &["ex"]),
    ("end", &["fin"]),
    ("hide", &["hid"]),
    ("history", &["his"]),
    ("images", &["img"]),
    ("items", &["itm"]),
    ("metafields", &["mf"]),
    ("order", &["ord"]),
    ("payments", &["pay"]),
    ("profiles", &["prf"]),
    ("receive", &["rcv"]),
    ("segments", &["seg"]),
    ("send", &["snd"]),
    ("send-invoice", &["si"]),
    ("start", &["go"]),
    ("stocks", &["stk"]),
    ("summary", &["sum"]),
    ("tracking", &["trk"]),
    ("unpublish", &["unp"]),
    ("variations", &["var"]),
];

const RESOURCE_ALIASES: AliasTable = &[
    // high frequency
    ("orders", &["ord", "o"]),
    ("products", &["prod", "p"]),
    ("customers", &["cust", "cu", "contacts", "contact"]),
    ("refunds", &["ref", "rf"]),
    ("collections", &["col"]),
    ("draft-orders", &["drafts", "do"]),
    ("fulfillments", &["ful", "ff"]),
    ("payments", &["pay"]),
    ("transactions", &["tx"]),
    ("shipments", &["shp"]),
    ("inventory", &["inv"]),
    // medium frequency
    ("abandoned-checkouts", &["ac"]),
    ("addon-products", &["ap"]),
    ("articles", &["art"]),
    ("auth", &["au"]),
    ("blogs", &["bl"]),
    ("carts", &["ct"]),
    ("categories", &["cat"]),
    ("channels", &["ch"]),
    ("conversations", &["conv", "cv"]),
    ("countries", &["cnt"]),
    ("coupons", &["cpn"]),
    ("currencies", &["cur"]),
    ("custom-fields", &["cf"]),
    ("customer-addresses", &["ca"]),
    ("customer-groups", &["cg"]),
    ("discount-codes", &["discounts", "dc"]),
    ("gift-cards", &["giftcard", "gc"]),
    ("inventory-levels", &["il"]),
    ("locations", &["loc"]),
    ("markets", &["mk"]),
    ("media", &["md"]),
    ("medias", &["mds"]),
    ("message-center", &["mc"]),
    ("metafields", &["mf"]),
    ("pages", &["pg"]),
    ("price-rules", &["pr"]),
    ("promotions", &["promo", "pm"]),
    ("return-orders", &["ro"]),
    ("schema", &["sch"]),
    ("settings", &["set"]),
    ("shipping-zones", &["sz"]),
    ("smart-collections", &["smc"]),
    ("staffs", &["sf"]),
    ("subscriptions", &["sub"]),
    ("tags", &["tg"]),
    ("taxes", &["tax"]),
    ("themes", &["th"]),
    ("token", &["tk"]),
    ("tokens", &["tok"]),
    ("warehouses", &["wh"]),
    ("webhooks", &["hooks", "hk"]),
];

/// Hidden aliases for the root's persistent flags, applied once at startup.
pub const ROOT_FLAG_ALIASES: &[(&str, &str)] = &[
    ("json", "j"),
    ("output", "out"),
    ("query", "qr"),
    ("query-file", "qf"),
    ("dry-run", "dr"),
    ("sort-by", "sb"),
    ("items-only", "io"),
    ("results-only", "ro"),
];

/// Hidden aliases for local flags that repeat across resource commands.
pub const COMMON_FLAG_ALIASES: &[(&str, &str)] = &[
    // pagination
    ("page", "pg"),
    ("page-size", "ps"),
    // filtering
    ("status", "S"),
    ("name", "n"),
    ("email", "e"),
    ("phone", "ph"),
    ("title", "ti"),
    ("tags", "tg"),
    ("handle", "h"),
    ("type", "tp"),
    ("sort-order", "so"),
    // ids
    ("customer-id", "cid"),
    ("product-id", "pid"),
    ("order-id", "oid"),
    ("variant-id", "vid"),
    ("location-id", "lid"),
    ("collection-id", "colid"),
    ("category-id", "catid"),
    ("warehouse-id", "wid"),
    ("order-ids", "ois"),
    ("product-ids", "pis"),
    // time
    ("from", "f"),
    ("to", "t"),
    ("since", "snc"),
    ("until", "utl"),
    // content
    ("body", "b"),
    ("body-file", "bf"),
    ("note", "N"),
    ("reason", "rsn"),
    // amounts
    ("amount", "amt"),
    ("quantity", "qty"),
    ("currency", "cur"),
];

static VERB_INDEX: Lazy<HashMap<&'static str, &'static [&'static str]>> =
    Lazy::new(|| VERB_ALIASES.iter().copied().collect());

static RESOURCE_INDEX: Lazy<HashMap<&'static str, &'static [&'static str]>> =
    Lazy::new(|| RESOURCE_ALIASES.iter().copied().collect());

static COMMON_FLAG_INDEX: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| COMMON_FLAG_ALIASES.iter().copied().collect());

/// Candidate aliases for a verb, in preference order.
pub fn verb_aliases(name: &str) -> &'static [&'static str] {
    VERB_INDEX.get(name).copied().unwrap_or_default()
}

/// Candidate aliases for a top-level resource, in preference order.
pub fn resource_aliases(name: &str) -> &'static [&'static str] {
    RESOURCE_INDEX.get(name).copied().unwrap_or_default()
}

/// The hidden alias for a common local flag, if one is configured.
pub fn common_flag_alias(flag: &str) -> Option<&'static str> {
    COMMON_FLAG_INDEX.get(flag).copied()
}
