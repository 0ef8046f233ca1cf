// End-to-end generation over simple shapes: structs of by-value fields,
// slices, maps, channels, receiver naming and determinism.

use dcgen_core::{generate_unformatted, Config};
use dcgen_model::{field, FuncDecl, Model, Receiver, SourceFile, UnitId};

fn hand_written(name: &str) -> SourceFile {
    SourceFile {
        name: name.to_string(),
        comments: vec![],
        funcs: vec![],
    }
}

fn unit_with_syntax(model: &mut Model) -> UnitId {
    let unit = model.add_unit("pkg", "example.com/pkg");
    model.add_file(unit, hand_written("types.go"));
    unit
}

fn gen(model: &Model, unit: UnitId, targets: &[&str], config: &Config) -> String {
    generate_unformatted(model, unit, targets, config).unwrap()
}

#[test]
fn value_fields_need_no_fixups() {
    let mut model = Model::new();
    let unit = unit_with_syntax(&mut model);
    let string = model.basic("string");
    let int = model.basic("int");
    let tags = model.slice_of(string);
    model.named_struct(
        unit,
        "Foo",
        vec![field("Name", string), field("Age", int), field("Tags", tags)],
    );

    let out = gen(&model, unit, &["Foo"], &Config::default());
    assert_eq!(
        out,
        "// Code generated by dcgen; DO NOT EDIT.\n\n\
         package pkg\n\n\
         // DeepCopy generates a deep copy of Foo\n\
         func (o Foo) DeepCopy() Foo {\n\
         var cp Foo = o\n\
         if o.Tags != nil {\n\
         cp.Tags = make([]string, len(o.Tags))\n\
         copy(cp.Tags, o.Tags)\n\
         }\n\
         return cp\n\
         }\n\n"
    );
}

#[test]
fn pointer_receivers_change_the_frame() {
    let mut model = Model::new();
    let unit = unit_with_syntax(&mut model);
    let int = model.basic("int");
    model.named_struct(unit, "Foo", vec![field("Age", int)]);

    let config = Config {
        pointer_receiver: true,
        ..Config::default()
    };
    let out = gen(&model, unit, &["Foo"], &config);
    assert!(out.contains("func (o *Foo) DeepCopy() *Foo {"));
    assert!(out.contains("var cp Foo = *o"));
    assert!(out.contains("return &cp\n}"));
}

#[test]
fn slice_of_structs_gets_an_element_loop() {
    let mut model = Model::new();
    let unit = unit_with_syntax(&mut model);
    let byte = model.basic("byte");
    let data = model.slice_of(byte);
    let item = model.named_struct(unit, "Item", vec![field("Data", data)]);
    let items = model.slice_of(item);
    model.named_struct(unit, "Foo", vec![field("Items", items)]);

    let out = gen(&model, unit, &["Foo"], &Config::default());
    assert!(out.contains("cp.Items = make([]Item, len(o.Items))"));
    assert!(out.contains("copy(cp.Items, o.Items)"));
    assert!(out.contains("for i2 := range o.Items {"));
    assert!(out.contains("cp.Items[i2].Data = make([]byte, len(o.Items[i2].Data))"));
    assert!(out.contains("copy(cp.Items[i2].Data, o.Items[i2].Data)"));
}

#[test]
fn channels_are_replaced_empty_with_equal_capacity() {
    let mut model = Model::new();
    let unit = unit_with_syntax(&mut model);
    let int = model.basic("int");
    let ch = model.chan_of(int);
    model.named_struct(unit, "Foo", vec![field("C", ch)]);

    let out = gen(&model, unit, &["Foo"], &Config::default());
    assert!(out.contains("if o.C != nil {\ncp.C = make(chan int, cap(o.C))\n}"));
}

#[test]
fn map_values_copy_through_temporaries() {
    let mut model = Model::new();
    let unit = unit_with_syntax(&mut model);
    let string = model.basic("string");
    let int = model.basic("int");
    let bar = model.named_struct(unit, "Bar", vec![field("N", int)]);
    let pbar = model.pointer_to(bar);
    let index = model.map_of(string, pbar);
    model.named_struct(unit, "Foo", vec![field("Index", index)]);

    let out = gen(&model, unit, &["Foo", "Bar"], &Config::default());
    assert!(out.contains("cp.Index = make(map[string]*Bar, len(o.Index))"));
    assert!(out.contains("for k2, v2 := range o.Index {"));
    assert!(out.contains("var cp_Index_v2 *Bar"));
    assert!(out.contains("retV := v2.DeepCopy()"));
    assert!(out.contains("cp_Index_v2 = &retV"));
    assert!(out.contains("cp.Index[k2] = cp_Index_v2"));

    // Bar itself has nothing to fix up.
    assert!(out.contains("func (o Bar) DeepCopy() Bar {\nvar cp Bar = o\nreturn cp\n}"));
}

#[test]
fn named_slice_targets_copy_the_receiver_itself() {
    let mut model = Model::new();
    let unit = unit_with_syntax(&mut model);
    let string = model.basic("string");
    let slice = model.slice_of(string);
    let tags = model.declare(unit, "Tags");
    model.define(tags, slice);

    let out = gen(&model, unit, &["Tags"], &Config::default());
    assert!(out.contains("func (o Tags) DeepCopy() Tags {"));
    assert!(out.contains("cp = make([]string, len(o))"));
    assert!(out.contains("copy(cp, o)"));
}

#[test]
fn receiver_names_follow_hand_written_methods() {
    let mut model = Model::new();
    let unit = model.add_unit("pkg", "example.com/pkg");
    model.add_file(
        unit,
        SourceFile {
            name: "foo.go".to_string(),
            comments: vec![],
            funcs: vec![FuncDecl {
                name: "String".to_string(),
                receiver: Some(Receiver {
                    type_name: "Foo".to_string(),
                    var_name: "f".to_string(),
                }),
            }],
        },
    );
    let int = model.basic("int");
    let ints = model.slice_of(int);
    model.named_struct(unit, "Foo", vec![field("Nums", ints)]);

    let out = gen(&model, unit, &["Foo"], &Config::default());
    assert!(out.contains("func (f Foo) DeepCopy() Foo {"));
    assert!(out.contains("var cp Foo = f"));
    assert!(out.contains("cp.Nums = make([]int, len(f.Nums))"));
}

#[test]
fn custom_method_names_are_used_throughout() {
    let mut model = Model::new();
    let unit = unit_with_syntax(&mut model);
    let int = model.basic("int");
    let bar = model.named_struct(unit, "Bar", vec![field("N", int)]);
    let bars = model.slice_of(bar);
    model.named_struct(unit, "Foo", vec![field("Bars", bars)]);

    let config = Config {
        method_name: "Clone".to_string(),
        ..Config::default()
    };
    let out = gen(&model, unit, &["Foo", "Bar"], &config);
    assert!(out.contains("func (o Foo) Clone() Foo {"));
    assert!(out.contains("cp.Bars[i2] = o.Bars[i2].Clone()"));
    assert!(!out.contains("DeepCopy"));
}

#[test]
fn reruns_are_byte_identical() {
    let mut model = Model::new();
    let unit = unit_with_syntax(&mut model);
    let string = model.basic("string");
    let int = model.basic("int");
    let bar = model.named_struct(unit, "Bar", vec![field("N", int)]);
    let pbar = model.pointer_to(bar);
    let index = model.map_of(string, pbar);
    let tags = model.slice_of(string);
    model.named_struct(unit, "Foo", vec![field("Tags", tags), field("Index", index)]);

    let config = Config::default();
    let first = gen(&model, unit, &["Foo", "Bar"], &config);
    let second = gen(&model, unit, &["Foo", "Bar"], &config);
    assert_eq!(first, second);
}

#[test]
fn schema_loaded_units_generate_end_to_end() {
    let (model, unit) = dcgen_model::load_model_from_str(
        r#"{
            "unit": { "name": "pkg", "path": "example.com/pkg" },
            "types": [
                { "name": "Foo", "fields": [
                    { "name": "Name", "type": "string" },
                    { "name": "Tags", "type": "[]string" }
                ]}
            ],
            "files": [ { "name": "types.go" } ]
        }"#,
    )
    .unwrap();

    let out = gen(&model, unit, &["Foo"], &Config::default());
    assert!(out.contains("package pkg"));
    assert!(out.contains("cp.Tags = make([]string, len(o.Tags))"));
}
