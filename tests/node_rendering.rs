use proptest::prelude::*;
use render_graph_nodes::label::LABEL_PADDING_PX;
use render_graph_nodes::shape::{POLYGON_SHAPES, RING_MARGIN_PX};
use render_graph_nodes::{
    draw_layout, CollectingSink, CoordinateTransform, LabelRenderer, LabelSpec, Point, Rect,
    RenderOptions, ShapeBuilder, SubPath, Transform, Warning,
};

fn square() -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, 10.0),
        Point::new(0.0, 10.0),
    ]
}

#[test]
fn box_scenario_yields_five_point_closed_path() {
    let transform = Transform::new(0.0, 0.0, 10.0, 10.0, 50.0, 50.0);
    let sink = CollectingSink::new();
    let path = ShapeBuilder::new(&transform, &sink).build("box", &square(), 1);

    let [SubPath::Polygon(points)] = path.subpaths() else {
        panic!("expected one polygon, got {:?}", path.subpaths());
    };
    assert_eq!(points.len(), 5);
    assert_eq!(points.first(), points.last());
    for (point, vertex) in points.iter().zip(square()) {
        assert_eq!(*point, transform.to_display(vertex, false));
    }
    assert!(sink.is_empty());
}

#[test]
fn ellipse_scenario_yields_inset_second_ring() {
    let transform = Transform::identity().with_zoom(3.0);
    let sink = CollectingSink::new();
    let path = ShapeBuilder::new(&transform, &sink).build(
        "ellipse",
        &[Point::new(0.0, 0.0), Point::new(20.0, 10.0)],
        2,
    );

    let outer = Rect { x0: 0.0, y0: 0.0, width: 60.0, height: 30.0 };
    assert_eq!(
        path.subpaths(),
        &[
            SubPath::Ellipse(outer),
            SubPath::Ellipse(outer.inset(RING_MARGIN_PX).unwrap()),
        ]
    );
    assert!(matches!(
        sink.warnings().as_slice(),
        [Warning::UnsupportedPeripheries { requested: 2, used: 2, .. }]
    ));
}

#[test]
fn unavailable_font_still_renders_label() {
    let transform = Transform::identity();
    let sink = CollectingSink::new();
    let renderer = LabelRenderer::new(&transform, &sink).unwrap();
    let label = renderer
        .render(&LabelSpec {
            text: "cmp eax, 0x10".to_string(),
            font_family: "Definitely Not Installed Mono".to_string(),
            font_size_px: 16.0,
            color: render_graph_nodes::Color::rgb(20, 40, 60),
            anchor: Point::new(100.0, 100.0),
        });

    let substitutions = sink
        .warnings()
        .into_iter()
        .filter(|w| matches!(w, Warning::FontSubstitution { .. }))
        .count();
    assert_eq!(substitutions, 1);
    assert!(!label.rect().is_empty());
    assert!(label.rect().width > 2.0 * LABEL_PADDING_PX);
    assert!(label.image().is_some());
}

#[test]
fn layout_file_renders_to_png_and_svg() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("graph.xml");
    let output = dir.path().join("graph.png");
    let svg = dir.path().join("graph.svg");
    std::fs::write(
        &input,
        r#"<graph>
             <node name="start" shape="hexagon">
               <vertex x="0" y="10"/><vertex x="10" y="0"/><vertex x="30" y="0"/>
               <vertex x="40" y="10"/><vertex x="30" y="20"/><vertex x="10" y="20"/>
               <label text="start" font="sans" size="10" x="20" y="10"/>
             </node>
             <node name="end" shape="doublecircle">
               <vertex x="60" y="0"/><vertex x="80" y="20"/>
             </node>
           </graph>"#,
    )
    .unwrap();

    let sink = CollectingSink::new();
    let view = draw_layout(&input, &output, Some(&svg), RenderOptions::default(), &sink).unwrap();

    assert_eq!(view.nodes().len(), 2);
    assert!(std::fs::metadata(&output).unwrap().len() > 0);
    assert!(std::fs::read_to_string(&svg).unwrap().contains("<svg"));
    assert!(sink
        .warnings()
        .contains(&Warning::UnsupportedShape { name: "doublecircle".into() }));
}

#[test]
fn missing_layout_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let sink = CollectingSink::new();
    let result = draw_layout(
        &dir.path().join("absent.xml"),
        &dir.path().join("out.png"),
        None,
        RenderOptions::default(),
        &sink,
    );
    assert!(result.is_err());
}

fn polygon_strategy() -> impl Strategy<Value = Vec<Point>> {
    prop::collection::vec((-1e4f64..1e4, -1e4f64..1e4), 3..12)
        .prop_map(|coords| coords.into_iter().map(|(x, y)| Point::new(x, y)).collect())
}

proptest! {
    #[test]
    fn polygons_close_on_their_first_vertex(
        vertices in polygon_strategy(),
        shape in prop::sample::select(POLYGON_SHAPES),
        zoom in 0.1f64..8.0,
    ) {
        let transform = Transform::identity().with_zoom(zoom);
        let sink = CollectingSink::new();
        let path = ShapeBuilder::new(&transform, &sink).build(shape, &vertices, 1);

        let [SubPath::Polygon(points)] = path.subpaths() else {
            panic!("expected one polygon");
        };
        prop_assert_eq!(points.len(), vertices.len() + 1);
        prop_assert_eq!(points.first(), points.last());
        prop_assert!(sink.is_empty());
    }

    #[test]
    fn ellipses_get_one_ring_per_periphery_while_they_fit(
        peripheries in 1i64..=8,
        width in 40.0f64..400.0,
        height in 40.0f64..400.0,
    ) {
        let transform = Transform::identity();
        let sink = CollectingSink::new();
        let path = ShapeBuilder::new(&transform, &sink).build(
            "ellipse",
            &[Point::new(0.0, 0.0), Point::new(width, height)],
            peripheries,
        );

        prop_assert_eq!(path.subpaths().len() as i64, peripheries);
        for (ring, subpath) in path.subpaths().iter().enumerate() {
            let SubPath::Ellipse(rect) = subpath else {
                panic!("expected ellipse");
            };
            let inset = RING_MARGIN_PX * ring as f64;
            prop_assert!((rect.x0 - inset).abs() < 1e-9);
            prop_assert!((rect.width - (width - 2.0 * inset)).abs() < 1e-9);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn labels_center_on_their_anchor(
        text in "[a-zA-Z0-9 ]{1,24}",
        size in 6.0f64..48.0,
        x in -500.0f64..500.0,
        y in -500.0f64..500.0,
    ) {
        let transform = Transform::identity().with_pan(250.0, 125.0);
        let sink = CollectingSink::new();
        let renderer = LabelRenderer::new(&transform, &sink).unwrap();
        let label = renderer
            .render(&LabelSpec {
                text,
                font_family: "sans".to_string(),
                font_size_px: size,
                color: render_graph_nodes::Color::rgb(0, 0, 0),
                anchor: Point::new(x, y),
            });

        let expected = transform.to_display(Point::new(x, y), false);
        let center = label.rect().center();
        prop_assert!((center.x - expected.x).abs() < 1e-6);
        prop_assert!((center.y - expected.y).abs() < 1e-6);
    }
}
