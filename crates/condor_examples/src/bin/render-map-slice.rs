use condor::prelude::*;
use condor_examples::{init_tracing, render_slice_to_png, SliceStyle};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let spacing = 1e-9;
    let request = MapRequest::new(spacing, spacing);
    let mut map = ParticleMap::new(ParticleMapConfig::new(Geometry::Icosahedron, 40e-9))?;
    let mut params = ParticleParams::with_diameter(40e-9);
    params.geometry = Some(Geometry::Icosahedron);

    let view = map.get_map(&request, &params)?;
    let center = view.grid.size() / 2;
    render_slice_to_png(
        view.grid,
        center,
        &SliceStyle::default().with_invert(true),
        "render-map-slice.png",
    )?;
    Ok(())
}
