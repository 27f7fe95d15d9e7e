//! End-to-end parsing tests: raw kernel-style struct text through the
//! preprocessor, parser, and flattener.

use pretty_assertions::assert_eq;
use serde_json::json;
use structdrift::parse_source;
use structdrift::tree::clean_value;

#[test]
fn test_kernel_style_struct_end_to_end() {
    let source = r#"
struct vtime {
    seqcount_t seqcount;
    unsigned long long starttime;
    enum vtime_state state;
    u64 utime;
    u64 stime;
    u64 gtime;
};
"#;
    let tree = parse_source(source).unwrap();
    assert_eq!(tree.type_name, "struct vtime");
    let fields = tree.fields().unwrap();
    let names: Vec<&str> = fields
        .iter()
        .map(|field| field.name.as_deref().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["seqcount", "starttime", "state", "utime", "stime", "gtime"]
    );
    assert_eq!(fields[0].type_name, "seqcount_t");
    assert_eq!(fields[1].type_name, "unsigned long long");
    assert_eq!(fields[2].type_name, "enum vtime_state");
}

#[test]
fn test_annotation_macros_and_defines_are_normalised() {
    let source = r#"
#define PAGE_COUNT 8
struct page_frag {
    struct page __rcu *page;
    __u32 offset;
    char slots[PAGE_COUNT];
} _struct_page_alignment;
"#;
    let tree = parse_source(source).unwrap();
    let fields = tree.fields().unwrap();
    assert_eq!(fields[0].type_name, "struct page");
    assert!(fields[0].is_pointer);
    assert!(fields[2].is_array);
    assert_eq!(fields[2].array_size, "8");
}

#[test]
fn test_conditional_blocks_flatten_into_guards() {
    let source = r#"
struct task_sample {
    int pid;
#ifdef CONFIG_SMP
    int on_cpu;
    unsigned int wake_cpu;
#endif
#if defined(CONFIG_VIRT_CPU_ACCOUNTING_GEN) && \
    !defined(CONFIG_64BIT)
    struct vtime vtime;
#endif
};
"#;
    let tree = parse_source(source).unwrap();
    let fields = tree.fields().unwrap();
    assert_eq!(fields.len(), 4);
    assert!(fields[0].guards.is_empty());
    assert_eq!(fields[1].guards, vec!["CONFIG_SMP"]);
    assert_eq!(fields[2].guards, vec!["CONFIG_SMP"]);
    assert_eq!(
        fields[3].guards,
        vec!["defined(CONFIG_VIRT_CPU_ACCOUNTING_GEN) && !defined(CONFIG_64BIT)"]
    );
}

#[test]
fn test_anonymous_enum_becomes_synthetic_field() {
    let source = r#"
struct sample {
    enum { STATE_A, STATE_B } mode;
    int value;
};
"#;
    let tree = parse_source(source).unwrap();
    let fields = tree.fields().unwrap();
    assert_eq!(fields[0].name.as_deref(), Some("shortened_enum_value_0"));
    assert_eq!(fields[0].type_name, "int");
    assert_eq!(fields[1].name.as_deref(), Some("value"));
}

#[test]
fn test_nested_union_and_function_pointer_serialization() {
    let source = r#"
struct file_ops {
    union {
        unsigned long key;
        void *ptr;
    } id;
    int (*open)(struct inode *inode, int flags);
};
"#;
    let tree = parse_source(source).unwrap();
    let mut value = serde_json::to_value(&tree).unwrap();
    clean_value(&mut value);
    assert_eq!(
        value,
        json!({
            "type": "struct file_ops",
            "fields": [
                {
                    "type": "union",
                    "name": "id",
                    "fields": [
                        {"type": "unsigned long", "name": "key"},
                        {"type": "void", "name": "ptr", "is_pointer": true},
                    ]
                },
                {
                    "type": "function pointer",
                    "name": "open",
                    "is_pointer": true,
                    "return": {"type": "int"},
                    "parameters": [
                        {"type": "struct inode", "is_pointer": true, "name": "inode"},
                        {"type": "int", "name": "flags"},
                    ]
                }
            ]
        })
    );
}

#[test]
fn test_else_branches_survive_flattening_with_opposite_guards() {
    let source = r#"
struct thread_info {
#ifdef CONFIG_64BIT
    unsigned long flags;
#else
    unsigned int flags32;
#endif
};
"#;
    let tree = parse_source(source).unwrap();
    let fields = tree.fields().unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].guards, vec!["CONFIG_64BIT"]);
    assert_eq!(fields[1].guards, vec!["!CONFIG_64BIT"]);
}

#[test]
fn test_parse_error_carries_source_window() {
    let source = "struct s {\n    int a;\n    int b = 3;\n};";
    let err = parse_source(source).unwrap_err();
    assert_eq!(err.line, 3);
    assert!(err.window.contains("->"));
    assert!(err.window.contains("int b = 3;"));
    let rendered = err.to_string();
    assert!(rendered.contains("parse error at line 3"));
}
