use query_engine_execution::flatten::flatten;
use query_engine_translation::translation::query::parse_query_shape;

/// Flatten the rows of a goldenfile case and return the resulting document alongside the
/// document the case expects.
pub fn flatten_goldenfile(testname: &str) -> anyhow::Result<(serde_json::Value, serde_json::Value)> {
    tests_common::logging::init();
    let goldenfile = tests_common::goldenfiles::load(testname)?;

    let shape = parse_query_shape(&goldenfile.query)?;
    let document = flatten(
        &shape,
        &goldenfile.rows,
        goldenfile.reference.as_ref(),
        goldenfile.options.include_formatted(),
    )?;

    Ok((document.to_json(), goldenfile.expected))
}
