//! phl-chart - renders the post-harvest loss scatter/regression chart.

use std::path::Path;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    phl_chart::run(
        Path::new(phl_chart::INPUT_PATH),
        Path::new(phl_chart::OUTPUT_PATH),
    )
}
