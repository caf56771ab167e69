use serde::{Deserialize, Serialize};

/// One column of the search table and where it comes from in each form variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    pub alias: &'static str,
    /// Expression against `f_5500_<year>_<section>`.
    pub long_form: &'static str,
    /// Expression against `f_5500_sf_<year>_<section>`.
    pub short_form: &'static str,
    pub data_type: &'static str,
}

impl ColumnMapping {
    const fn new(
        alias: &'static str,
        long_form: &'static str,
        short_form: &'static str,
        data_type: &'static str,
    ) -> Self {
        Self {
            alias,
            long_form,
            short_form,
            data_type,
        }
    }

    pub fn index_name(&self) -> String {
        format!("form5500_search_view_{}_idx", self.alias)
    }
}

// Order drives CREATE TABLE, both SELECT lists and the INSERT column list.
static TABLE_MAPPINGS: &[ColumnMapping] = &[
    ColumnMapping::new("ack_id", "ack_id", "ack_id", "text"),
    ColumnMapping::new(
        "plan_year_begin_date",
        "form_plan_year_begin_date",
        "sf_plan_year_begin_date",
        "text",
    ),
    ColumnMapping::new("plan_name", "plan_name", "sf_plan_name", "text"),
    ColumnMapping::new("plan_number", "spons_dfe_pn", "sf_plan_num", "text"),
    ColumnMapping::new("sponsor_name", "sponsor_dfe_name", "sf_sponsor_name", "text"),
    ColumnMapping::new("sponsor_ein", "spons_dfe_ein", "sf_spons_ein", "text"),
    ColumnMapping::new(
        "sponsor_city",
        "spons_dfe_mail_us_city",
        "sf_spons_us_city",
        "text",
    ),
    ColumnMapping::new(
        "sponsor_state",
        "spons_dfe_mail_us_state",
        "sf_spons_us_state",
        "text",
    ),
    ColumnMapping::new(
        "sponsor_zip",
        "spons_dfe_mail_us_zip",
        "sf_spons_us_zip",
        "text",
    ),
    ColumnMapping::new("business_code", "business_code", "sf_business_code", "text"),
    ColumnMapping::new(
        "pension_benefit_code",
        "type_pension_bnft_code",
        "sf_type_pension_bnft_code",
        "text",
    ),
    ColumnMapping::new(
        "participants",
        "tot_partcp_boy_cnt",
        "sf_tot_partcp_boy_cnt",
        "int",
    ),
    ColumnMapping::new(
        "active_participants",
        "tot_active_partcp_cnt",
        "sf_tot_act_partcp_eoy_cnt",
        "int",
    ),
    // Long forms carry assets on Schedule H/I; filled in by the schedule updates.
    ColumnMapping::new(
        "total_assets",
        "NULL::numeric",
        "sf_tot_assets_eoy_amt",
        "numeric",
    ),
];

pub fn table_mappings() -> &'static [ColumnMapping] {
    TABLE_MAPPINGS
}

/// Provider slots filled from Schedule C part 1 item 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderRole {
    Recordkeeper,
    Tpa,
    Advisor,
}

impl ProviderRole {
    pub const ALL: [ProviderRole; 3] = [Self::Recordkeeper, Self::Tpa, Self::Advisor];

    pub fn column_prefix(&self) -> &'static str {
        match self {
            Self::Recordkeeper => "rk",
            Self::Tpa => "tpa",
            Self::Advisor => "advisor",
        }
    }

    /// Schedule C service codes that qualify a provider for this slot.
    pub fn service_codes(&self) -> &'static [&'static str] {
        match self {
            // 15 recordkeeping and information management, 64 recordkeeping fees
            Self::Recordkeeper => &["15", "64"],
            // 13 contract administrator, 14 plan administrator
            Self::Tpa => &["13", "14"],
            // 23/24 investment advisory, 26 investment management
            Self::Advisor => &["23", "24", "26"],
        }
    }

    pub fn name_column(&self) -> String {
        format!("{}_name", self.column_prefix())
    }

    pub fn ein_column(&self) -> String {
        format!("{}_ein", self.column_prefix())
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Recordkeeper => "recordkeeper",
            Self::Tpa => "tpa",
            Self::Advisor => "advisor",
        }
    }
}

/// Boolean investment flags, each backed by a Schedule H end-of-year amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvestmentType {
    CollectiveTrusts,
    SeparateAccounts,
    MutualFunds,
    GeneralAccounts,
    CompanyStock,
}

impl InvestmentType {
    pub const ALL: [InvestmentType; 5] = [
        Self::CollectiveTrusts,
        Self::SeparateAccounts,
        Self::MutualFunds,
        Self::GeneralAccounts,
        Self::CompanyStock,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            Self::CollectiveTrusts => "inv_collective_trusts",
            Self::SeparateAccounts => "inv_separate_accounts",
            Self::MutualFunds => "inv_mutual_funds",
            Self::GeneralAccounts => "inv_general_accounts",
            Self::CompanyStock => "inv_company_stock",
        }
    }

    pub fn schedule_h_column(&self) -> &'static str {
        match self {
            Self::CollectiveTrusts => "int_common_tr_eoy_amt",
            Self::SeparateAccounts => "int_pool_sep_acct_eoy_amt",
            Self::MutualFunds => "int_reg_invst_co_eoy_amt",
            Self::GeneralAccounts => "ins_co_gen_acct_eoy_amt",
            Self::CompanyStock => "emplr_sec_eoy_amt",
        }
    }
}

/// One row of the recordkeeper mapping CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RkMapping {
    #[sqlx(rename = "sched_c_provider_name")]
    pub provider_name: String,
    #[sqlx(rename = "fbi_company_id")]
    pub company_id: i32,
}

/// One line of the unmatched recordkeeper report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSuggestion {
    pub rk_name: String,
    pub possible_match: Option<String>,
    pub company_id: Option<i32>,
    pub distance: Option<i32>,
}

impl MatchSuggestion {
    pub fn unmatched(rk_name: impl Into<String>) -> Self {
        Self {
            rk_name: rk_name.into(),
            possible_match: None,
            company_id: None,
            distance: None,
        }
    }

    pub fn has_match(&self) -> bool {
        self.possible_match.is_some()
    }
}
