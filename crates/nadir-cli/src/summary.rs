use console::Style;
use nadir_core::pipeline::config::RunConfig;
use nadir_core::select::SelectionReport;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_run_summary(config: &RunConfig, dry_run: bool) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Nadir Pipeline"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(14)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Frames"),
        s.path.apply_to(config.frames.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Orientation"),
        s.path.apply_to(config.orientation.display())
    );
    if dry_run {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Output"),
            s.disabled.apply_to("dry run")
        );
    } else {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Output"),
            s.path.apply_to(config.output.display())
        );
        println!(
            "  {:<14}{}",
            s.label.apply_to("Format"),
            s.value.apply_to(config.output_format)
        );
    }
    println!();

    println!("  {}", s.header.apply_to("Frame Selection"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Target"),
        s.value.apply_to(&config.selection.target)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Keep"),
        s.method.apply_to(&config.selection.criterion)
    );
    println!();

    if let Some(ref orient) = config.orient {
        println!("  {}", s.header.apply_to("Orientation"));
        println!(
            "    {:<12}{}",
            s.label.apply_to("Reference"),
            s.method.apply_to(orient.reference)
        );
        println!(
            "    {:<12}{}",
            s.label.apply_to("Direction"),
            s.value.apply_to(orient.direction)
        );
        println!(
            "    {:<12}{}",
            s.label.apply_to("Plane"),
            s.value.apply_to(orient.plane)
        );
        println!();
    } else {
        println!(
            "  {:<14}{}",
            s.header.apply_to("Orientation"),
            s.disabled.apply_to("disabled")
        );
    }

    if let Some(ref clean) = config.clean {
        println!("  {}", s.header.apply_to("Cleanup"));
        println!(
            "    {:<12}{}",
            s.label.apply_to("Blur"),
            s.value.apply_to(format!("lowest {}%", clean.blur_percentile))
        );
        println!(
            "    {:<12}{}",
            s.label.apply_to("Median"),
            s.value
                .apply_to(format!("{0}x{0}", clean.median_window))
        );
    } else {
        println!(
            "  {:<14}{}",
            s.header.apply_to("Cleanup"),
            s.disabled.apply_to("disabled")
        );
    }
    println!();
}

pub fn print_selection_report(report: &SelectionReport) {
    let s = Styles::new();

    println!();
    println!("  {}", s.header.apply_to("Selection"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Target"),
        s.value.apply_to(report.target)
    );
    if let Some(ref axis) = report.axis {
        println!(
            "    {:<12}{} {}",
            s.label.apply_to("Auto axis"),
            s.method.apply_to(axis.pole),
            s.label.apply_to(format!(
                "(mean dot: +Z={:.3}, -Z={:.3})",
                axis.mean_pos_z, axis.mean_neg_z
            ))
        );
    }
    println!(
        "    {:<12}{}",
        s.label.apply_to("Criterion"),
        s.method.apply_to(report.criterion)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Kept"),
        s.value
            .apply_to(format!("{} of {}", report.kept_count(), report.total))
    );
}
