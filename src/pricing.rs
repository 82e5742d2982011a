//! Cost aggregation for both quote types. Pure functions; unparsable
//! numeric text counts as zero.

use crate::currency::parse;
use crate::model::{
    CalculationInput, CalculationResult, CostBreakdown, CostDetails, PrintJobInput,
    ProjectDetails, ProjectInput,
};

pub fn calculate(input: &CalculationInput) -> CalculationResult {
    match input {
        CalculationInput::PrintJob(job) => price_print_job(job),
        CalculationInput::Project(project) => price_project(project),
    }
}

pub fn price_print_job(input: &PrintJobInput) -> CalculationResult {
    let quantity = input.quantity.max(1);
    let qty = f64::from(quantity);

    let material_cost = (parse(&input.filament_cost_per_kg) / 1000.0)
        * parse(&input.material_weight)
        * qty;
    let time_cost = (parse(&input.machine_hour_cost) + parse(&input.energy_hour_cost))
        * parse(&input.print_time)
        * qty;
    let other_cost = parse(&input.finishing_cost) * qty;
    let addon_cost = input.addons.iter().map(|a| a.price).sum::<f64>() * qty;

    let subtotal = material_cost + time_cost + other_cost + addon_cost;
    // Loss inflates the base before profit is taken from it.
    let subtotal_with_loss = subtotal * (1.0 + f64::from(input.loss_margin) / 100.0);
    let profit = subtotal_with_loss * (f64::from(input.profit_margin) / 100.0);
    let total = subtotal_with_loss + profit;

    CalculationResult {
        description: input.description.clone(),
        quantity,
        total,
        unit_price: total / qty,
        addons: input.addons.clone(),
        details: CostDetails::PrintJob(CostBreakdown {
            material_cost,
            time_cost,
            other_cost,
            addon_cost,
            profit,
            loss_amount: subtotal_with_loss - subtotal,
            profit_margin: input.profit_margin,
            loss_margin: input.loss_margin,
        }),
    }
}

pub fn price_project(input: &ProjectInput) -> CalculationResult {
    let execution_hours = parse(&input.execution_time);
    let hourly_rate = parse(&input.hourly_rate);
    let materials_cost = parse(&input.materials_cost);
    let software_cost = parse(&input.software_cost);
    let other_costs = parse(&input.other_costs);

    let total = execution_hours * hourly_rate + materials_cost + software_cost + other_costs;

    CalculationResult {
        description: input.description.clone(),
        quantity: 1,
        total,
        unit_price: total,
        addons: Vec::new(),
        details: CostDetails::Project(ProjectDetails {
            execution_hours,
            hourly_rate,
            materials_cost,
            software_cost,
            other_costs,
            deadline: input
                .deadline
                .as_ref()
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        }),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::model::Addon;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn reference_job() -> PrintJobInput {
        PrintJobInput {
            description: "Suporte de celular".into(),
            material_weight: "100".into(),
            print_time: "2".into(),
            quantity: 1,
            profit_margin: 30,
            loss_margin: 10,
            finishing_cost: "0,00".into(),
            filament_cost_per_kg: "0,20".into(),
            machine_hour_cost: "3,50".into(),
            energy_hour_cost: "1,03".into(),
            addons: vec![],
        }
    }

    #[test]
    fn test_print_job_reference_values() {
        let result = price_print_job(&reference_job());
        let CostDetails::PrintJob(b) = &result.details else {
            panic!("expected print job breakdown");
        };
        assert!(close(b.material_cost, 0.02));
        assert!(close(b.time_cost, 9.06));
        assert!(close(b.loss_amount, 0.908));
        assert!(close(b.profit, 2.9964));
        assert!(close(result.total, 12.9844));
        assert!(close(result.unit_price, 12.9844));
        assert_eq!(result.quantity, 1);
    }

    #[test]
    fn test_print_job_loss_applied_before_profit() {
        let mut job = reference_job();
        job.material_weight = "0".into();
        job.print_time = "0".into();
        job.finishing_cost = "100,00".into();
        let result = price_print_job(&job);
        // 100 * 1.10 = 110, profit 33
        assert!(close(result.total, 143.0));
    }

    #[test]
    fn test_print_job_quantity_and_addons() {
        let mut job = reference_job();
        job.quantity = 4;
        job.loss_margin = 0;
        job.profit_margin = 0;
        job.material_weight = "0".into();
        job.print_time = "0".into();
        job.addons = vec![
            Addon { name: "LED".into(), price: 2.5 },
            Addon { name: "Ímã".into(), price: 0.5 },
        ];
        let result = price_print_job(&job);
        let CostDetails::PrintJob(b) = &result.details else {
            panic!("expected print job breakdown");
        };
        assert!(close(b.addon_cost, 12.0));
        assert!(close(result.total, 12.0));
        assert!(close(result.unit_price, 3.0));
        assert_eq!(result.addons.len(), 2);
    }

    #[test]
    fn test_print_job_garbage_fields_are_zero() {
        let mut job = reference_job();
        job.print_time = "abc".into();
        job.material_weight = "".into();
        let result = price_print_job(&job);
        assert_eq!(result.total, 0.0);
    }

    #[test]
    fn test_project_total() {
        let input = ProjectInput {
            description: "Modelagem".into(),
            execution_time: "3".into(),
            hourly_rate: "50,00".into(),
            materials_cost: "10".into(),
            software_cost: "5".into(),
            other_costs: "0".into(),
            deadline: Some("  ".into()),
        };
        let result = price_project(&input);
        assert_eq!(result.total, 165.0);
        assert_eq!(result.quantity, 1);
        assert_eq!(result.deadline(), None);
    }

    #[test]
    fn test_calculate_dispatches_on_type() {
        let input = CalculationInput::PrintJob(reference_job());
        assert!(close(calculate(&input).total, 12.9844));
    }
}
