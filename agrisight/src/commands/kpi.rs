// agrisight/src/commands/kpi.rs
//
// USE CASE: KPI card and grouped breakdown for a selection.

use agrisight_core::domain::kpi::{GroupOrder, KpiAggregator};

use super::open_session;
use crate::cli::{FilterArgs, GroupBy, OrderBy, SourceArgs};
use crate::render::{group_breakdown, kpi_card};

pub fn execute(
    source: SourceArgs,
    filter: FilterArgs,
    by: GroupBy,
    order: OrderBy,
) -> anyhow::Result<()> {
    let (_config, _store, session) = open_session(&source)?;
    let filter = filter.to_filter();
    let view = session.recompute(&filter);

    println!(
        "📊 {} ({} records selected, {:?} scope)",
        view.filter_summary,
        view.filtered_records,
        session.kpi_config().scope
    );
    println!("{}", kpi_card(&view.kpis));

    let rows = session.filtered(&filter);
    let scoped = session.kpi_config().scope.select(rows.iter().copied());
    let (label, groups) = match by {
        GroupBy::Region => ("Region", KpiAggregator::by_region(scoped.iter().copied())),
        GroupBy::Agent => ("Agent", KpiAggregator::by_agent(scoped.iter().copied())),
        GroupBy::Country => ("Country", KpiAggregator::by_country(scoped.iter().copied())),
    };
    let groups = KpiAggregator::order(groups, GroupOrder::from(order));
    println!("{}", group_breakdown(label, &groups));

    println!("🚨 {}", view.alert_message());
    Ok(())
}
