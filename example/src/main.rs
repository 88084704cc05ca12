// example/src/main.rs

use hustgen::*;
use hustgen_schema::scalar_width;

const GEO_IDL: &str = include_str!("../geo.idl");

/// Bytes a message occupies on the wire when every member is fixed width,
/// `None` once a `string` (or anything variable) is involved.
fn fixed_size(schema: &Schema, message: &Message) -> Option<usize> {
    message.members.iter().try_fold(0, |total, member| {
        let width = match member.type_.kind() {
            TypeKind::Scalar => scalar_width(member.type_.name())?,
            TypeKind::MessageRef => fixed_size(schema, schema.message(member.type_.name())?)?,
            TypeKind::Stream => return None,
        };
        Some(total + width)
    })
}

fn signature(method: &Method) -> String {
    let args: Vec<&str> = method.request_types.iter().map(Type::name).collect();
    format!("{} {}({})", method.response_type.name(), method.name, args.join(", "))
}

fn main() -> Result<(), CompileError> {
    let schema = compile_source("geo.idl", GEO_IDL)?;

    for message in schema.messages.values() {
        match fixed_size(&schema, message) {
            Some(size) => println!("message {} ({} bytes)", message.name, size),
            None => println!("message {} (variable size)", message.name),
        }
        for member in &message.members {
            println!("    {} {}", member.type_.name(), member.name);
        }
    }

    for method in schema.methods() {
        let owner = schema.service_of(method).map(|s| s.name.as_str()).unwrap_or("?");
        let streaming = match method.stream_parameter() {
            Some(stream) => format!(" [streams {}]", stream.name()),
            None => String::new(),
        };
        println!("{}.{}{}", owner, signature(method), streaming);
    }

    let replies = schema
        .response_types()
        .filter(|t| t.kind() == TypeKind::MessageRef)
        .count();
    println!("{} of {} methods reply with a message", replies, schema.methods().count());

    Ok(())
}
