//! Payment methods, channels and account types
//!
//! All enumerations are closed. The catalog tables below map every
//! `(PaymentMethod, TransactionType)` pair to the upstream channels and the
//! destination account types a routing rule may reference. The tables are
//! exhaustive `match` expressions, so adding a method or a transaction type
//! without extending them fails to compile.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a transaction
///
/// Determines which account-type vocabulary and which channel universe apply
/// to a routing rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Funds flowing into the platform
    Deposit,
    /// Funds paid out of the platform
    Withdrawal,
}

/// Payment method a routing rule is scoped to
///
/// Rules never apply across methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    BankTransfer,
    Momo,
    Zalopay,
    ViettelMoney,
}

/// Upstream payment processor or integration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentChannel {
    Napas,
    Bankhub,
    Payoo,
    Baokim,
    Onepay,
    MomoDirect,
    ZalopayDirect,
    ViettelDirect,
}

/// Destination account type a rule may be restricted to
///
/// Deposit and withdrawal use disjoint vocabularies; see
/// [`PaymentMethod::account_types`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    VirtualAccount,
    StaticQr,
    DynamicQr,
    BankAccount,
    BankCard,
    EWallet,
}

impl TransactionType {
    pub const ALL: [TransactionType; 2] = [TransactionType::Deposit, TransactionType::Withdrawal];

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Withdrawal => "WITHDRAWAL",
        }
    }
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::BankTransfer,
        PaymentMethod::Momo,
        PaymentMethod::Zalopay,
        PaymentMethod::ViettelMoney,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
            PaymentMethod::Momo => "MOMO",
            PaymentMethod::Zalopay => "ZALOPAY",
            PaymentMethod::ViettelMoney => "VIETTEL_MONEY",
        }
    }

    /// Channels a rule for this method and transaction type may route to
    pub fn channels(self, tx_type: TransactionType) -> &'static [PaymentChannel] {
        use PaymentChannel::*;
        match (self, tx_type) {
            (PaymentMethod::BankTransfer, TransactionType::Deposit) => {
                &[Napas, Bankhub, Payoo, Baokim]
            }
            (PaymentMethod::BankTransfer, TransactionType::Withdrawal) => &[Napas, Baokim, Onepay],
            (PaymentMethod::Momo, TransactionType::Deposit) => &[MomoDirect, Payoo, Baokim],
            (PaymentMethod::Momo, TransactionType::Withdrawal) => &[MomoDirect],
            (PaymentMethod::Zalopay, TransactionType::Deposit) => &[ZalopayDirect, Payoo],
            (PaymentMethod::Zalopay, TransactionType::Withdrawal) => &[ZalopayDirect, Baokim],
            (PaymentMethod::ViettelMoney, TransactionType::Deposit) => &[ViettelDirect, Baokim],
            (PaymentMethod::ViettelMoney, TransactionType::Withdrawal) => &[ViettelDirect],
        }
    }

    /// Account types a rule for this method and transaction type may filter on
    pub fn account_types(self, tx_type: TransactionType) -> &'static [AccountType] {
        use AccountType::*;
        match (self, tx_type) {
            (PaymentMethod::BankTransfer, TransactionType::Deposit) => {
                &[VirtualAccount, StaticQr, DynamicQr]
            }
            (PaymentMethod::BankTransfer, TransactionType::Withdrawal) => &[BankAccount, BankCard],
            (
                PaymentMethod::Momo | PaymentMethod::Zalopay | PaymentMethod::ViettelMoney,
                TransactionType::Deposit,
            ) => &[StaticQr, DynamicQr],
            (
                PaymentMethod::Momo | PaymentMethod::Zalopay | PaymentMethod::ViettelMoney,
                TransactionType::Withdrawal,
            ) => &[EWallet],
        }
    }

    pub fn supports_channel(self, tx_type: TransactionType, channel: PaymentChannel) -> bool {
        self.channels(tx_type).contains(&channel)
    }

    pub fn supports_account_type(self, tx_type: TransactionType, account_type: AccountType) -> bool {
        self.account_types(tx_type).contains(&account_type)
    }
}

impl PaymentChannel {
    pub const ALL: [PaymentChannel; 8] = [
        PaymentChannel::Napas,
        PaymentChannel::Bankhub,
        PaymentChannel::Payoo,
        PaymentChannel::Baokim,
        PaymentChannel::Onepay,
        PaymentChannel::MomoDirect,
        PaymentChannel::ZalopayDirect,
        PaymentChannel::ViettelDirect,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentChannel::Napas => "NAPAS",
            PaymentChannel::Bankhub => "BANKHUB",
            PaymentChannel::Payoo => "PAYOO",
            PaymentChannel::Baokim => "BAOKIM",
            PaymentChannel::Onepay => "ONEPAY",
            PaymentChannel::MomoDirect => "MOMO_DIRECT",
            PaymentChannel::ZalopayDirect => "ZALOPAY_DIRECT",
            PaymentChannel::ViettelDirect => "VIETTEL_DIRECT",
        }
    }
}

impl AccountType {
    pub const ALL: [AccountType; 6] = [
        AccountType::VirtualAccount,
        AccountType::StaticQr,
        AccountType::DynamicQr,
        AccountType::BankAccount,
        AccountType::BankCard,
        AccountType::EWallet,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AccountType::VirtualAccount => "VIRTUAL_ACCOUNT",
            AccountType::StaticQr => "STATIC_QR",
            AccountType::DynamicQr => "DYNAMIC_QR",
            AccountType::BankAccount => "BANK_ACCOUNT",
            AccountType::BankCard => "BANK_CARD",
            AccountType::EWallet => "E_WALLET",
        }
    }
}

/// Implements `Display` and a case-insensitive `FromStr` over the wire names
macro_rules! wire_name_impls {
    ($($ty:ident),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl FromStr for $ty {
                type Err = String;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    let wanted = s.trim();
                    $ty::ALL
                        .iter()
                        .copied()
                        .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                        .ok_or_else(|| format!("unknown {} '{}'", stringify!($ty), s))
                }
            }
        )*
    };
}

wire_name_impls!(TransactionType, PaymentMethod, PaymentChannel, AccountType);
