use serde::{de::DeserializeOwned, Serialize};

use crate::dynamodb::Item;
use crate::error::Result;
use crate::keys::KeyRuleSet;

/// A type that can be stored and read back through a [`Dao`](crate::dao::Dao).
///
/// Key derivation is a property of the type: every instance shares the same
/// [`KeyRuleSet`]. The field mapping view and the factory default to the
/// type's serde representation.
///
/// Key objects passed to `get` and the query methods only need `Serialize`.
/// Their optional fields should serialize `None` as `NULL` (the serde default,
/// so do not add `skip_serializing_if`), which is what truncates a derived key
/// into a prefix.
///
/// ```
/// use dynamo_single_table::keys::KeyRuleSet;
/// use dynamo_single_table::record::Record;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Order {
///     customer: String,
///     placed: String,
///     total: i64,
/// }
///
/// impl Record for Order {
///     fn key_rules() -> KeyRuleSet {
///         KeyRuleSet::new(["customer"], ["!ORDER", "placed"])
///     }
/// }
///
/// assert_eq!(Order::type_name(), "Order");
/// ```
pub trait Record: Serialize + DeserializeOwned {
    /// Partition and sort key specs shared by all instances.
    fn key_rules() -> KeyRuleSet;

    /// Value written to the table's type attribute, when one is configured.
    fn type_name() -> &'static str {
        let full = std::any::type_name::<Self>();
        let path = full.split('<').next().unwrap_or(full);
        path.rsplit("::").next().unwrap_or(path)
    }

    /// The record's field mapping.
    fn to_item(&self) -> Result<Item> {
        Item::from_record(self)
    }

    /// Materializes a record from a field mapping returned by the store.
    fn from_item(item: Item) -> Result<Self> {
        item.into_record()
    }
}
