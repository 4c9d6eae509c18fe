use anyhow::Result;
use snowgrid::{BoundingBox, SamplingPlan};

pub fn run(bounds: BoundingBox, grid: bool, spacing: f64, json: bool) -> Result<()> {
    let plan = if grid {
        SamplingPlan::UniformGrid { spacing }
    } else {
        SamplingPlan::Strategic
    };
    let points = plan.points(&bounds)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&points)?);
        return Ok(());
    }

    println!("{:<24} {:>9} {:>10}  priority", "name", "lat", "lon");
    println!("{:-<56}", "");
    for p in &points {
        println!("{:<24} {:>9.4} {:>10.4}  {}", p.name, p.lat, p.lon, p.priority);
    }
    println!("{:-<56}", "");
    println!("{} sample points", points.len());

    let outside = points
        .iter()
        .filter(|p| !bounds.contains(p.lat, p.lon))
        .count();
    if outside > 0 {
        println!("warning: {} points lie outside the bounds", outside);
    }

    Ok(())
}
