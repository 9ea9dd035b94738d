use std::{cell::RefCell, rc::Rc};
use tenon_core::{
    Context, Dialect, EnumValue, FieldConfig, ForeignCollection, Result, SqlType, TableConfig,
    TableDef, Value,
    persister::{EnumNamePersister, EnumOrdinalPersister},
};

/// Billing tier of an [`Account`], persisted by name through
/// [`ACCOUNT_TIER_BY_NAME`] unless a test picks the ordinal persister.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AccountTier {
    #[default]
    Basic,
    Silver,
    Gold,
}

pub const ACCOUNT_TIER_VARIANTS: &[EnumValue] = &[
    EnumValue {
        name: "Basic",
        ordinal: 0,
    },
    EnumValue {
        name: "Silver",
        ordinal: 1,
    },
    EnumValue {
        name: "Gold",
        ordinal: 2,
    },
];

pub static ACCOUNT_TIER_BY_NAME: EnumNamePersister = EnumNamePersister::new(ACCOUNT_TIER_VARIANTS);
pub static ACCOUNT_TIER_BY_ORDINAL: EnumOrdinalPersister =
    EnumOrdinalPersister::new(ACCOUNT_TIER_VARIANTS);

impl AccountTier {
    pub fn as_value(self) -> EnumValue {
        ACCOUNT_TIER_VARIANTS[self as usize]
    }

    pub fn from_value(value: EnumValue) -> Result<Self> {
        [Self::Basic, Self::Silver, Self::Gold]
            .into_iter()
            .find(|tier| *tier as i32 == value.ordinal)
            .with_context(|| format!("Ordinal {} does not match any account tier", value.ordinal))
    }
}

/// Owner side of the one-to-many fixture. `orders` is deferred and only
/// runs a query when a test fetches it.
#[derive(Debug, Default)]
pub struct Account {
    pub id: Option<i32>,
    pub name: String,
    pub password: Option<String>,
    pub tier: AccountTier,
    pub orders: Option<ForeignCollection<Order>>,
}

/// Child side, holding the owner id in its `account_id` column. Reading a
/// row builds a shell [`Account`] carrying only the id, unless the owner
/// instance is handed down during collection iteration.
#[derive(Debug, Default)]
pub struct Order {
    pub id: Option<i32>,
    pub account: Option<Rc<RefCell<Account>>>,
    pub quantity: i32,
    pub total: i64,
}

pub fn account_table(dialect: &dyn Dialect) -> Result<Rc<TableDef<Account>>> {
    TableConfig::new(Account::default)
        .field(
            FieldConfig::new("id", SqlType::Integer)
                .generated_id()
                .get(|account: &Account| Value::Int32(account.id))
                .set(|account, value| Ok(account.id = value.to_i32()?)),
        )
        .field(
            FieldConfig::new("name", SqlType::Text)
                .get(|account: &Account| Value::Varchar(Some(account.name.clone())))
                .set(|account, value| Ok(account.name = value.to_text()?.unwrap_or_default())),
        )
        .field(
            FieldConfig::new("password", SqlType::Text)
                .get(|account: &Account| Value::Varchar(account.password.clone()))
                .set(|account, value| Ok(account.password = value.to_text()?)),
        )
        .field(
            FieldConfig::new("tier", SqlType::Enum)
                .persister(&ACCOUNT_TIER_BY_NAME)
                .get(|account: &Account| Value::Enum(Some(account.tier.as_value())))
                .set(|account, value| {
                    account.tier = match value.to_enum()? {
                        Some(value) => AccountTier::from_value(value)?,
                        None => AccountTier::default(),
                    };
                    Ok(())
                }),
        )
        .field(
            FieldConfig::foreign_collection("orders", "account_id").collection(
                |account: &mut Account, seed| {
                    account.orders = Some(ForeignCollection::new(seed));
                    Ok(())
                },
            ),
        )
        .build(dialect)
}

pub fn order_table(dialect: &dyn Dialect) -> Result<Rc<TableDef<Order>>> {
    TableConfig::new(Order::default)
        .table_name("orders")
        .field(
            FieldConfig::new("id", SqlType::Integer)
                .generated_id()
                .get(|order: &Order| Value::Int32(order.id))
                .set(|order, value| Ok(order.id = value.to_i32()?)),
        )
        .field(
            FieldConfig::new("account", SqlType::Integer)
                .column_name("account_id")
                .foreign()
                .get(|order: &Order| match &order.account {
                    Some(account) => Value::Int32(account.borrow().id),
                    None => Value::Int32(None),
                })
                .set(|order, value| {
                    order.account = value.to_i32()?.map(|id| {
                        Rc::new(RefCell::new(Account {
                            id: Some(id),
                            ..Default::default()
                        }))
                    });
                    Ok(())
                })
                .parent(|order, parent| {
                    match parent.clone().downcast::<RefCell<Account>>() {
                        Ok(account) => {
                            order.account = Some(account);
                            true
                        }
                        Err(..) => false,
                    }
                }),
        )
        .field(
            FieldConfig::new("quantity", SqlType::Integer)
                .get(|order: &Order| Value::Int32(Some(order.quantity)))
                .set(|order, value| Ok(order.quantity = value.to_i32()?.unwrap_or_default())),
        )
        .field(
            FieldConfig::new("total", SqlType::Long)
                .get(|order: &Order| Value::Int64(Some(order.total)))
                .set(|order, value| Ok(order.total = value.to_i64()?.unwrap_or_default())),
        )
        .build(dialect)
}
