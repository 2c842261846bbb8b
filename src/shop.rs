//! Cosmetic skin shop
//!
//! Skins recolor the runner. They are bought with quest currency and have no
//! gameplay effect.

use thiserror::Error;

/// A purchasable skin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkinItem {
    pub id: &'static str,
    pub name: &'static str,
    pub price: u64,
    /// Tint applied to the player model (0xRRGGBB)
    pub color: u32,
}

pub const CATALOG: [SkinItem; 4] = [
    SkinItem {
        id: "crimson",
        name: "Crimson",
        price: 100,
        color: 0xd1201b,
    },
    SkinItem {
        id: "aurora",
        name: "Aurora",
        price: 250,
        color: 0x00ffcc,
    },
    SkinItem {
        id: "nebula",
        name: "Nebula",
        price: 400,
        color: 0x9b5de5,
    },
    SkinItem {
        id: "solar",
        name: "Solar",
        price: 600,
        color: 0xffb703,
    },
];

/// Look up a catalog entry by id
pub fn find(id: &str) -> Option<&'static SkinItem> {
    CATALOG.iter().find(|item| item.id == id)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShopError {
    #[error("unknown item: {0}")]
    UnknownItem(String),
    #[error("item already owned: {0}")]
    AlreadyOwned(String),
    #[error("insufficient funds: need {price}, have {balance}")]
    InsufficientFunds { price: u64, balance: u64 },
    #[error("item not owned: {0}")]
    NotOwned(String),
}

/// Currency balance, owned skins and the equipped one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wardrobe {
    pub currency: u64,
    pub purchases: Vec<String>,
    pub equipped: Option<String>,
}

impl Wardrobe {
    pub const CURRENCY_KEY: &'static str = "spaceRunnerCurrency";
    pub const PURCHASES_KEY: &'static str = "spaceRunnerShopPurchases";
    pub const EQUIPPED_KEY: &'static str = "spaceRunnerEquippedSkin";

    pub fn owns(&self, id: &str) -> bool {
        self.purchases.iter().any(|p| p == id)
    }

    pub fn credit(&mut self, amount: u64) {
        self.currency = self.currency.saturating_add(amount);
    }

    /// Buy a skin, deducting its price once
    pub fn purchase(&mut self, id: &str) -> Result<&'static SkinItem, ShopError> {
        let item = find(id).ok_or_else(|| ShopError::UnknownItem(id.to_string()))?;
        if self.owns(id) {
            return Err(ShopError::AlreadyOwned(id.to_string()));
        }
        if self.currency < item.price {
            return Err(ShopError::InsufficientFunds {
                price: item.price,
                balance: self.currency,
            });
        }
        self.currency -= item.price;
        self.purchases.push(item.id.to_string());
        log::info!("Purchased {} for {}", item.id, item.price);
        Ok(item)
    }

    pub fn equip(&mut self, id: &str) -> Result<&'static SkinItem, ShopError> {
        let item = find(id).ok_or_else(|| ShopError::UnknownItem(id.to_string()))?;
        if !self.owns(id) {
            return Err(ShopError::NotOwned(id.to_string()));
        }
        self.equipped = Some(item.id.to_string());
        Ok(item)
    }

    pub fn unequip(&mut self) {
        self.equipped = None;
    }

    /// Tint for the equipped skin. A stale id (no longer in the catalog) is ignored.
    pub fn equipped_tint(&self) -> Option<u32> {
        self.equipped.as_deref().and_then(find).map(|item| item.color)
    }
}
