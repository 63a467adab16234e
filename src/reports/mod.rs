use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use sleepscore::analysis::{Matchup, ScoreSummary, ScoredGame};
use sleepscore::config::ScoringWeights;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn right_align(table: &mut Table, columns: std::ops::RangeInclusive<usize>) {
    for i in columns {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

fn delta_cell(v: i32) -> Cell {
    let cell = Cell::new(v);
    match v.signum() {
        -1 => cell.fg(Color::Red),
        1 => cell.fg(Color::Green),
        _ => cell,
    }
}

fn opt_hours(v: Option<f64>) -> String {
    v.map(|h| format!("{:.1}", h)).unwrap_or_else(|| "-".to_string())
}

pub fn print_timeline_report(entity: &str, games: &[ScoredGame], w: &ScoringWeights) {
    println!("\nTeam: {}", entity);
    let mut table = new_table();

    table.add_row(vec![
        Cell::new("Date").add_attribute(Attribute::Bold),
        Cell::new("Opponent"),
        Cell::new("Venue"),
        Cell::new(format!("Dens\n{}/{}", w.penalty_density_single, w.penalty_density_multiple)),
        Cell::new(format!("Alt\n{}", w.penalty_altitude)),
        Cell::new(format!("Nite\n{}", w.penalty_nightlife)),
        Cell::new("Debt h"),
        Cell::new(format!("Debt\n-{}/h", w.penalty_sleep_debt_per_hour)),
        Cell::new("Body"),
        Cell::new(format!(
            "Circ\n{}/+{}",
            w.penalty_handicapped_hours, w.bonus_optimal_hours
        )),
        Cell::new("Rest h"),
        Cell::new(format!("Rest\n{}", w.penalty_short_rest)),
        Cell::new("Score").fg(Color::Cyan),
    ]);

    right_align(&mut table, 3..=12);

    for g in games {
        let r = g.record;
        let b = g.breakdown;
        let opponent = if r.is_home {
            format!("vs {}", r.opponent)
        } else {
            format!("@ {}", r.opponent)
        };
        table.add_row(vec![
            Cell::new(r.sequence_date.format("%Y-%m-%d")).add_attribute(Attribute::Bold),
            Cell::new(opponent),
            Cell::new(&r.venue.city),
            delta_cell(b.density),
            delta_cell(b.altitude),
            delta_cell(b.nightlife),
            Cell::new(format!("{:+.1}", b.running_sleep_debt)),
            delta_cell(b.sleep_debt),
            Cell::new(opt_hours(b.body_clock_hour)),
            delta_cell(b.circadian),
            Cell::new(opt_hours(b.rest_hours)),
            delta_cell(b.rest_time),
            Cell::new(b.final_score).add_attribute(Attribute::Bold),
        ]);
    }
    println!("{}", table);
}

pub fn print_summary_report(summary: &ScoreSummary, baseline: i32) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Sleep Score").add_attribute(Attribute::Bold),
        Cell::new("Games"),
        Cell::new("Wins"),
        Cell::new("Losses"),
        Cell::new("Loss %").fg(Color::Red),
    ]);
    right_align(&mut table, 1..=4);

    let below = &summary.below_baseline;
    table.add_row(vec![
        Cell::new(format!("< {}", baseline)).add_attribute(Attribute::Bold),
        Cell::new(below.games),
        Cell::new(below.wins),
        Cell::new(below.losses),
        Cell::new(format!("{:.2}%", below.loss_ratio())),
    ]);

    for bucket in &summary.buckets {
        let t = &bucket.tally;
        table.add_row(vec![
            Cell::new(format!("[{}, {})", bucket.low, bucket.high)),
            Cell::new(t.games),
            Cell::new(t.wins),
            Cell::new(t.losses),
            Cell::new(format!("{:.2}%", t.loss_ratio())),
        ]);
    }

    println!(
        "\n📊 {} games scored, {} above {}",
        summary.total, summary.above_baseline, baseline
    );
    println!("{}", table);
}

pub fn print_matchup_report(matchups: &[Matchup], low: i32, high: i32, rested: i32) {
    if matchups.is_empty() {
        println!("\nNo games where one side scores {}-{} and the other {}.", low, high, rested);
        return;
    }

    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Date").add_attribute(Attribute::Bold),
        Cell::new("Visitor"),
        Cell::new("Score"),
        Cell::new("Home"),
        Cell::new("Score"),
    ]);
    right_align(&mut table, 2..=2);
    right_align(&mut table, 4..=4);

    let score_cell = |s: i32| {
        if s == rested {
            Cell::new(s).fg(Color::Green)
        } else {
            Cell::new(s).fg(Color::Red)
        }
    };

    for m in matchups {
        table.add_row(vec![
            Cell::new(m.date.format("%Y-%m-%d")).add_attribute(Attribute::Bold),
            Cell::new(&m.visitor),
            score_cell(m.visitor_score),
            Cell::new(&m.home),
            score_cell(m.home_score),
        ]);
    }

    println!(
        "\n🎯 {} games where one team scores {}-{} and the opponent {}:",
        matchups.len(),
        low,
        high,
        rested
    );
    println!("{}", table);
}
