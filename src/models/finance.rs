//! 财务数据模型

use serde::{Deserialize, Serialize};

/// 核心财务指标
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinanceCore {
    pub stock_code: String,
    pub short_name: String,
    /// 报告期
    pub report_date: String,
    /// 年报 / 中报 / 三季报 / 一季报
    pub report_type: String,
    /// 公告日期
    pub notice_date: String,

    // 每股指标
    pub basic_eps: f64,
    pub diluted_eps: f64,
    pub non_gaap_eps: f64,
    pub net_asset_ps: f64,
    pub cap_reserve_ps: f64,
    pub undist_profit_ps: f64,
    pub oper_cf_ps: f64,

    // 盈利能力
    pub total_rev: f64,
    pub gross_profit: f64,
    pub net_profit_attr_sh: f64,
    pub non_gaap_net_profit: f64,
    pub total_rev_yoy_gr: f64,
    pub net_profit_yoy_gr: f64,
    pub non_gaap_net_profit_yoy_gr: f64,
    pub total_rev_qoq_gr: f64,
    pub net_profit_qoq_gr: f64,
    pub non_gaap_net_profit_qoq_gr: f64,

    // 盈利质量
    pub roe_wtd: f64,
    pub roe_non_gaap_wtd: f64,
    pub roa_wtd: f64,
    pub gross_margin: f64,
    pub net_margin: f64,

    // 现金流
    pub adv_receipts_to_rev: f64,
    pub net_cf_sales_to_rev: f64,
    pub oper_cf_to_rev: f64,
    pub eff_tax_rate: f64,

    // 偿债能力
    pub curr_ratio: f64,
    pub quick_ratio: f64,
    pub cash_flow_ratio: f64,
    pub asset_liab_ratio: f64,
    pub equity_multiplier: f64,
    pub equity_ratio: f64,

    // 运营能力
    pub total_asset_turn_days: f64,
    pub inv_turn_days: f64,
    pub acct_recv_turn_days: f64,
    pub total_asset_turn_rate: f64,
    pub inv_turn_rate: f64,
    pub acct_recv_turn_rate: f64,
}

/// 资产负债表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub stock_code: String,
    pub report_date: String,
    pub report_type: String,
    pub notice_date: String,

    // 资产
    pub total_assets: f64,
    pub current_assets: f64,
    pub non_current_assets: f64,
    pub cash_and_cash_equivalents: f64,
    pub accounts_receivable: f64,
    pub inventory: f64,
    pub fixed_assets: f64,
    pub intangible_assets: f64,

    // 负债
    pub total_liabilities: f64,
    pub current_liabilities: f64,
    pub non_current_liabilities: f64,
    pub short_term_borrowing: f64,
    pub accounts_payable: f64,
    pub long_term_borrowing: f64,

    // 所有者权益
    pub total_equity: f64,
    pub share_capital: f64,
    pub capital_reserve: f64,
    pub retained_earnings: f64,
}

/// 现金流量表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CashFlowSheet {
    pub stock_code: String,
    pub report_date: String,
    pub report_type: String,
    pub notice_date: String,

    // 经营活动
    pub net_cash_flows_oper_act: f64,
    pub cash_inflows_oper_act: f64,
    pub cash_outflows_oper_act: f64,
    pub sales_services_render: f64,
    pub tax_refunds: f64,
    pub purchase_goods_services: f64,
    pub payment_staff_benefits: f64,
    pub payments_taxes: f64,

    // 投资活动
    pub net_cash_flows_inv_act: f64,
    pub cash_inflows_inv_act: f64,
    pub cash_outflows_inv_act: f64,
    pub purchase_assets: f64,
    pub invest_payments: f64,

    // 筹资活动
    pub net_cash_flows_fin_act: f64,
    pub cash_inflows_fin_act: f64,
    pub cash_outflows_fin_act: f64,
    pub borrowings_received: f64,
    pub repayment_borrowings: f64,
    pub dividends_paid: f64,

    // 现金净增加额
    pub net_increase_cash: f64,
    pub cash_begin_period: f64,
    pub cash_end_period: f64,
}

/// 利润表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeSheet {
    pub stock_code: String,
    pub report_date: String,
    pub report_type: String,
    pub notice_date: String,

    // 营业总收入
    pub total_operating_revenue: f64,
    pub operating_revenue: f64,
    pub interest_income: f64,
    pub premiums_earned: f64,
    pub commission_income: f64,

    // 营业总成本
    pub total_operating_cost: f64,
    pub operating_cost: f64,
    pub interest_expense: f64,
    pub commission_expense: f64,
    pub surrender_value: f64,
    pub net_compensation_expense: f64,
    pub net_amortization_expense: f64,
    pub policy_bonus_expense: f64,
    pub taxes_surcharges: f64,
    pub sales_expense: f64,
    pub admin_expense: f64,
    pub fin_expense: f64,
    pub asset_impairment_loss: f64,
    pub credit_impairment_loss: f64,

    // 营业利润
    pub gross_profit: f64,
    pub operating_profit: f64,
    pub non_operating_income: f64,
    pub non_operating_expense: f64,
    /// 资产处置收益
    pub loss_disposal_assets: f64,

    // 利润总额与净利润
    pub total_profit: f64,
    pub income_tax_expense: f64,
    pub net_profit: f64,
    /// 归属于母公司股东的净利润
    pub net_profit_attr_sh: f64,
    pub net_profit_minority: f64,
    pub net_profit_continuing: f64,
    pub net_profit_discontinued: f64,

    // 每股收益
    pub basic_eps: f64,
    pub diluted_eps: f64,
}
