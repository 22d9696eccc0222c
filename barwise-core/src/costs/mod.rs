//! Transaction costs.

pub mod commission;

pub use commission::{
    CommissionConfig, CommissionModel, FixedPlusProportional, NoCommission, TieredCommission,
};
