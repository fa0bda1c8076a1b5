// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FinanceError;
use crate::utils::{percent, serde_date};

/// Closed string-backed enum: one wire spelling per variant (plus optional
/// aliases accepted on input), stored as TEXT.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $variant:ident => $text:tt $(| $alias:tt)* ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( #[serde(rename = $text $(, alias = $alias)*)] $variant, )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text, )+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = FinanceError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $( $text $(| $alias)* => Ok($name::$variant), )+
                    other => Err(FinanceError::Validation(format!(
                        "Invalid {} '{}'",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: FinanceError| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

text_enum! {
    pub enum TransactionType {
        Income => "income",
        Expense => "expense",
    }
}

text_enum! {
    pub enum Category {
        Salary => "Salary",
        Business => "Business",
        Investment => "Investment",
        Freelance => "Freelance",
        Dividend => "Dividend",
        Interest => "Interest",
        OtherIncome => "Other Income",
        Food => "Food",
        Transport => "Transport",
        Bills => "Bills",
        Shopping => "Shopping",
        Entertainment => "Entertainment",
        Health => "Health",
        Education => "Education",
        Subscription => "Subscription",
        DebtPayment => "Debt Payment",
        OtherExpense => "Other Expense",
    }
}

text_enum! {
    pub enum SubCategory {
        Active => "Active",
        Passive => "Passive",
        Needs => "Needs",
        Wants => "Wants",
    }
}

text_enum! {
    pub enum PaymentMethod {
        Cash => "Cash",
        DebitCard => "Debit Card",
        CreditCard => "Credit Card",
        BankTransfer => "Bank Transfer",
        EWallet => "E-Wallet",
        PayLater => "Pay Later",
    }
}

text_enum! {
    pub enum TransactionStatus {
        Completed => "Completed",
        Pending => "Pending",
        Cancelled => "Cancelled",
    }
}

text_enum! {
    pub enum AccountType {
        Bank => "Bank",
        EWallet => "E-Wallet",
        Cash => "Cash",
        Investment => "Investment",
        CreditCard => "Credit Card",
        Other => "Other",
    }
}

text_enum! {
    pub enum DebtType {
        CreditCard => "Credit Card",
        Mortgage => "Mortgage",
        CarLoan => "Car Loan",
        PersonalLoan => "Personal Loan",
        StudentLoan => "Student Loan",
        Installment => "Installment",
        Other => "Other",
    }
}

text_enum! {
    pub enum MutualFundType {
        Equity => "Equity",
        FixedIncome => "Fixed Income",
        Mixed => "Mixed",
        MoneyMarket => "Money Market",
    }
}

text_enum! {
    pub enum GoldType {
        Antam => "Antam",
        Ubs => "UBS",
        Jewelry => "Jewelry",
        Other => "Other",
    }
}

text_enum! {
    pub enum Frequency {
        Daily => "Daily" | "daily",
        Weekly => "Weekly" | "weekly",
        Monthly => "Monthly" | "monthly",
        Yearly => "Yearly" | "yearly",
        Adhoc => "Adhoc" | "adhoc",
    }
}

text_enum! {
    pub enum BudgetPeriod {
        Monthly => "Monthly" | "monthly",
        Weekly => "Weekly" | "weekly",
        Yearly => "Yearly" | "yearly",
    }
}

text_enum! {
    /// The four instrument collections reachable through `/investments/detailed/{kind}`.
    pub enum InstrumentKind {
        Stocks => "stocks",
        Deposits => "deposits",
        Gold => "gold",
        MutualFunds => "mutual_funds",
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

impl Default for TransactionStatus {
    fn default() -> Self {
        TransactionStatus::Completed
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::Monthly
    }
}

impl Default for BudgetPeriod {
    fn default() -> Self {
        BudgetPeriod::Monthly
    }
}

impl TransactionType {
    /// +amount for income, -amount for expense.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            TransactionType::Income => amount,
            TransactionType::Expense => -amount,
        }
    }
}

impl PaymentMethod {
    /// Methods whose expenses are charged to a debt instead of settled immediately.
    pub fn is_deferred(&self) -> bool {
        matches!(self, PaymentMethod::CreditCard | PaymentMethod::PayLater)
    }
}

// ---------------------------------------------------------------- accounts

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub r#type: AccountType,
    pub balance: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub name: String,
    pub r#type: AccountType,
    #[serde(default)]
    pub balance: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountUpdate {
    pub name: Option<String>,
    pub r#type: Option<AccountType>,
    pub currency: Option<String>,
}

// ------------------------------------------------------------ transactions

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub r#type: TransactionType,
    pub category: Category,
    pub sub_category: Option<SubCategory>,
    pub account: String,
    pub payment_method: PaymentMethod,
    pub status: TransactionStatus,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn signed_amount(&self) -> Decimal {
        self.r#type.signed(self.amount)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTransaction {
    pub description: String,
    pub amount: Decimal,
    pub r#type: TransactionType,
    pub category: Category,
    #[serde(default)]
    pub sub_category: Option<SubCategory>,
    pub account: String,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub status: TransactionStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, with = "serde_date::option")]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionUpdate {
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub r#type: Option<TransactionType>,
    pub category: Option<Category>,
    pub sub_category: Option<SubCategory>,
    pub account: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub status: Option<TransactionStatus>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(default, with = "serde_date::option")]
    pub date: Option<NaiveDate>,
}

// ------------------------------------------------------------- investments

/// Listed shares are bought in lots of this many units.
pub const LOT_SIZE: i64 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stock {
    pub id: String,
    pub ticker: String,
    pub name: String,
    pub securities: String,
    pub lots: Decimal,
    pub buy_price: Decimal,
    pub current_price: Decimal,
    pub buy_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Stock {
    /// `None` when the value does not fit a `Decimal`.
    pub fn current_value(&self) -> Option<Decimal> {
        self.lots
            .checked_mul(Decimal::from(LOT_SIZE))?
            .checked_mul(self.current_price)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewStock {
    pub ticker: String,
    pub name: String,
    pub securities: String,
    pub lots: Decimal,
    pub buy_price: Decimal,
    pub current_price: Decimal,
    #[serde(default, with = "serde_date::option")]
    pub buy_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockUpdate {
    pub ticker: Option<String>,
    pub name: Option<String>,
    pub securities: Option<String>,
    pub lots: Option<Decimal>,
    pub buy_price: Option<Decimal>,
    pub current_price: Option<Decimal>,
    #[serde(default, with = "serde_date::option")]
    pub buy_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deposit {
    pub id: String,
    pub bank_name: String,
    pub amount: Decimal,
    pub tenor_months: u32,
    pub interest_rate: Decimal,
    pub start_date: NaiveDate,
    pub maturity_date: NaiveDate,
    pub is_auto_renewal: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Deposit {
    pub fn current_value(&self) -> Option<Decimal> {
        Some(self.amount)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDeposit {
    pub bank_name: String,
    pub amount: Decimal,
    pub tenor_months: u32,
    pub interest_rate: Decimal,
    #[serde(default, with = "serde_date::option")]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_auto_renewal: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DepositUpdate {
    pub bank_name: Option<String>,
    pub amount: Option<Decimal>,
    pub tenor_months: Option<u32>,
    pub interest_rate: Option<Decimal>,
    #[serde(default, with = "serde_date::option")]
    pub start_date: Option<NaiveDate>,
    pub is_auto_renewal: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gold {
    pub id: String,
    pub r#type: GoldType,
    pub weight_grams: Decimal,
    pub buy_price_per_gram: Decimal,
    pub current_price_per_gram: Decimal,
    pub purchase_location: String,
    pub buy_date: NaiveDate,
    pub certificate_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Gold {
    pub fn current_value(&self) -> Option<Decimal> {
        self.weight_grams.checked_mul(self.current_price_per_gram)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewGold {
    pub r#type: GoldType,
    pub weight_grams: Decimal,
    pub buy_price_per_gram: Decimal,
    pub current_price_per_gram: Decimal,
    pub purchase_location: String,
    #[serde(default, with = "serde_date::option")]
    pub buy_date: Option<NaiveDate>,
    #[serde(default)]
    pub certificate_number: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoldUpdate {
    pub r#type: Option<GoldType>,
    pub weight_grams: Option<Decimal>,
    pub buy_price_per_gram: Option<Decimal>,
    pub current_price_per_gram: Option<Decimal>,
    pub purchase_location: Option<String>,
    #[serde(default, with = "serde_date::option")]
    pub buy_date: Option<NaiveDate>,
    pub certificate_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutualFund {
    pub id: String,
    pub product_name: String,
    pub fund_manager: String,
    pub r#type: MutualFundType,
    pub units: Decimal,
    pub buy_nav: Decimal,
    pub current_nav: Decimal,
    pub buy_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MutualFund {
    pub fn current_value(&self) -> Option<Decimal> {
        self.units.checked_mul(self.current_nav)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMutualFund {
    pub product_name: String,
    pub fund_manager: String,
    pub r#type: MutualFundType,
    pub units: Decimal,
    pub buy_nav: Decimal,
    pub current_nav: Decimal,
    #[serde(default, with = "serde_date::option")]
    pub buy_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MutualFundUpdate {
    pub product_name: Option<String>,
    pub fund_manager: Option<String>,
    pub r#type: Option<MutualFundType>,
    pub units: Option<Decimal>,
    pub buy_nav: Option<Decimal>,
    pub current_nav: Option<Decimal>,
    #[serde(default, with = "serde_date::option")]
    pub buy_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

// ------------------------------------------------------------------- debts

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debt {
    pub id: String,
    pub debt_type: DebtType,
    pub creditor: String,
    pub principal_amount: Decimal,
    pub current_balance: Decimal,
    pub interest_rate: Decimal,
    pub monthly_payment: Decimal,
    pub remaining_installments: u32,
    pub due_date: String, // day of month, "05"
    pub start_date: NaiveDate,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDebt {
    pub debt_type: DebtType,
    pub creditor: String,
    pub principal_amount: Decimal,
    pub current_balance: Decimal,
    pub interest_rate: Decimal,
    pub monthly_payment: Decimal,
    pub remaining_installments: u32,
    pub due_date: String,
    #[serde(default, with = "serde_date::option")]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DebtUpdate {
    pub debt_type: Option<DebtType>,
    pub creditor: Option<String>,
    pub principal_amount: Option<Decimal>,
    pub current_balance: Option<Decimal>,
    pub interest_rate: Option<Decimal>,
    pub monthly_payment: Option<Decimal>,
    pub remaining_installments: Option<u32>,
    pub due_date: Option<String>,
    #[serde(default, with = "serde_date::option")]
    pub start_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DebtPaymentRequest {
    pub amount: Decimal,
    pub account: String,
    #[serde(default, with = "serde_date::option")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

// ------------------------------------------------------------------- bills

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    pub due_date: String, // day of month
    pub period: Frequency,
    pub category: Category,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBill {
    pub name: String,
    pub amount: Decimal,
    pub due_date: String,
    #[serde(default)]
    pub period: Frequency,
    #[serde(default = "default_bill_category")]
    pub category: Category,
}

fn default_bill_category() -> Category {
    Category::Bills
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BillUpdate {
    pub name: Option<String>,
    pub amount: Option<Decimal>,
    pub due_date: Option<String>,
    pub period: Option<Frequency>,
    pub category: Option<Category>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillPayment {
    pub id: String,
    pub bill_id: String,
    pub bill_name: String,
    pub amount: Decimal,
    pub due_date: String,
    pub payment_date: NaiveDate,
    pub is_paid: bool,
    pub month_year: String,
    pub notes: Option<String>,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBillPayment {
    pub bill_id: String,
    #[serde(default)]
    pub bill_name: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default, with = "serde_date::option")]
    pub payment_date: Option<NaiveDate>,
    pub month_year: String,
    #[serde(default)]
    pub notes: Option<String>,
}

// --------------------------------------------------------------- recurring

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringTransaction {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    pub r#type: TransactionType,
    pub category: Category,
    pub account: String,
    pub frequency: Frequency,
    pub day_of_month: u32,
    pub is_active: bool,
    pub last_generated: Option<DateTime<Utc>>,
    pub next_due: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRecurringTransaction {
    pub name: String,
    pub amount: Decimal,
    pub r#type: TransactionType,
    pub category: Category,
    pub account: String,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default = "default_day_of_month")]
    pub day_of_month: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_day_of_month() -> u32 {
    1
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecurringTransactionUpdate {
    pub name: Option<String>,
    pub amount: Option<Decimal>,
    pub r#type: Option<TransactionType>,
    pub category: Option<Category>,
    pub account: Option<String>,
    pub frequency: Option<Frequency>,
    pub day_of_month: Option<u32>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringPayment {
    pub id: String,
    pub recurring_id: String,
    pub transaction_id: String,
    pub amount: Decimal,
    pub month_year: String,
    pub paid_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayRequest {
    #[serde(default)]
    pub month_year: Option<String>,
}

// ------------------------------------------------------------------- goals

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialGoal {
    pub id: String,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub target_date: NaiveDate,
    pub category: String,
    pub is_achieved: bool,
    pub notes: Option<String>,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FinancialGoal {
    /// Progress toward the target in percent; 0 for a non-positive target.
    pub fn progress(&self) -> Decimal {
        percent(self.current_amount, self.target_amount)
    }
}

pub const DEFAULT_GOAL_COLOR: &str = "#6366f1";

#[derive(Debug, Clone, Deserialize)]
pub struct NewGoal {
    pub name: String,
    pub target_amount: Decimal,
    #[serde(default)]
    pub current_amount: Decimal,
    #[serde(with = "serde_date")]
    pub target_date: NaiveDate,
    pub category: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoalUpdate {
    pub name: Option<String>,
    pub target_amount: Option<Decimal>,
    pub current_amount: Option<Decimal>,
    #[serde(default, with = "serde_date::option")]
    pub target_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub is_achieved: Option<bool>,
    pub notes: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalContribution {
    pub id: String,
    pub goal_id: String,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewContribution {
    pub amount: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
}

// ----------------------------------------------------------------- budgets

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: String,
    pub category: Category,
    pub amount: Decimal,
    pub period: BudgetPeriod,
    pub month_year: String, // YYYY-MM
    /// Derived on every read from the month's expense transactions.
    pub spent: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBudget {
    pub category: Category,
    pub amount: Decimal,
    #[serde(default)]
    pub period: BudgetPeriod,
    #[serde(default)]
    pub month_year: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BudgetUpdate {
    pub category: Option<Category>,
    pub amount: Option<Decimal>,
    pub period: Option<BudgetPeriod>,
    pub month_year: Option<String>,
    pub is_active: Option<bool>,
}
